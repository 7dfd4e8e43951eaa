//! HTTP error mapping.

use super::types::MessageResponse;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use registrar_core::StoreError;
use thiserror::Error;

/// Response message for any body that fails to parse or validate.
pub const INVALID_BODY: &str = "Invalid request body";

/// Response message for an absent student.
pub const STUDENT_NOT_FOUND: &str = "Student not found";

/// Response message for a body over the configured size limit.
pub const BODY_TOO_LARGE: &str = "Request body too large";

/// Errors a handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body is not JSON, misses required fields, or carries bad values.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// Body exceeds `max_body_bytes`.
    #[error("request body too large")]
    PayloadTooLarge,

    #[error("student not found")]
    NotFound,

    /// Backend or encoding failure.
    #[error(transparent)]
    Store(StoreError),

    /// The blocking task running a store call panicked or was cancelled.
    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        if err.is_not_found() {
            Self::NotFound
        } else {
            Self::Store(err)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::MalformedRequest(reason) => {
                tracing::debug!(reason = %reason, "Rejected request body");
                (StatusCode::BAD_REQUEST, INVALID_BODY.to_owned())
            }
            Self::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, BODY_TOO_LARGE.to_owned()),
            Self::NotFound => (StatusCode::NOT_FOUND, STUDENT_NOT_FOUND.to_owned()),
            Self::Store(err) => {
                tracing::error!(error = %err, "Store operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                )
            }
            Self::Task(err) => {
                tracing::error!(error = %err, "Store task failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                )
            }
        };

        (status, Json(MessageResponse { message })).into_response()
    }
}
