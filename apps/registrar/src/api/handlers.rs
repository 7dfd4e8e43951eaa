//! Request handlers.
//!
//! Each handler maps one verb + path onto a single store call. Bodies are
//! parsed and validated before the store is touched, so a rejected body
//! never mutates anything.
//!
//! Store calls are synchronous (redb commits sync to disk) and run on
//! tokio's blocking pool through [`with_store`].

use super::AppState;
use super::error::ApiError;
use super::types::{CreatedResponse, HealthResponse, MessageResponse, PhotoUpload};
use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::IntoResponse;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use registrar_core::{
    ExamCenter, Photo, Specialization, StudentDraft, StudentId, StudentRecord, StudentStore,
    Subject,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Run `call` against the shared store on the blocking pool.
async fn with_store<T, F>(state: &AppState, call: F) -> Result<T, ApiError>
where
    F: FnOnce(&StudentStore) -> registrar_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.store);
    let result = tokio::task::spawn_blocking(move || call(&store)).await?;
    Ok(result?)
}

/// Map an extractor rejection: over-limit bodies are 413, the rest are
/// malformed.
fn rejected(rejection: JsonRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

/// Unwrap a JSON body, turning every extractor rejection and every blank
/// required field into a request error.
fn parse_draft(body: Result<Json<StudentDraft>, JsonRejection>) -> Result<StudentDraft, ApiError> {
    let Json(draft) = body.map_err(rejected)?;
    draft
        .validate()
        .map_err(|err| ApiError::MalformedRequest(err.to_string()))?;
    Ok(draft)
}

// =============================================================================
// HEALTH
// =============================================================================

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
        version: registrar_core::VERSION.to_owned(),
    })
}

// =============================================================================
// STUDENTS
// =============================================================================

/// `POST /api/students`
pub async fn register_student(
    State(state): State<AppState>,
    body: Result<Json<StudentDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let draft = parse_draft(body)?;
    let id = with_store(&state, move |store| store.create(draft)).await?;
    info!(student_id = %id, "Student registered");

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id,
            message: "Student registered successfully".to_owned(),
        }),
    ))
}

/// `GET /api/students/{id}`
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StudentRecord>, ApiError> {
    let id = StudentId::new(id);
    with_store(&state, move |store| store.get(&id))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// `GET /api/students`
pub async fn list_students(
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentRecord>>, ApiError> {
    let students = with_store(&state, StudentStore::list).await?;
    debug!(count = students.len(), "Listed students");
    Ok(Json(students))
}

/// `PUT /api/students/{id}`: full replacement, creating the record if absent.
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<StudentDraft>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let draft = parse_draft(body)?;
    let id = StudentId::new(id);
    let target = id.clone();
    with_store(&state, move |store| store.update(&target, draft)).await?;
    info!(student_id = %id, "Student updated");

    Ok(Json(MessageResponse::new("Student updated successfully")))
}

/// `DELETE /api/students/{id}`: reports success whether or not the id existed.
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = StudentId::new(id);
    let target = id.clone();
    let existed = with_store(&state, move |store| store.delete(&target)).await?;
    info!(student_id = %id, existed, "Student deleted");

    Ok(Json(MessageResponse::new("Student deleted successfully")))
}

// =============================================================================
// PHOTOS
// =============================================================================

/// `PUT /api/students/{id}/photo`
pub async fn upload_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<PhotoUpload>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(upload) = body.map_err(rejected)?;

    if upload.content_type.trim().is_empty() {
        return Err(ApiError::MalformedRequest("blank content type".to_owned()));
    }
    HeaderValue::from_str(&upload.content_type)
        .map_err(|_| ApiError::MalformedRequest("invalid content type".to_owned()))?;
    let bytes = STANDARD
        .decode(upload.data.as_bytes())
        .map_err(|err| ApiError::MalformedRequest(format!("invalid base64: {err}")))?;

    let id = StudentId::new(id);
    let target = id.clone();
    let size = bytes.len();
    let photo = Photo {
        content_type: upload.content_type,
        bytes,
    };
    let reference = with_store(&state, move |store| store.put_photo(&target, &photo)).await?;
    info!(student_id = %id, size, reference = %reference, "Photo stored");

    Ok(Json(MessageResponse::new("Photo uploaded successfully")))
}

/// `GET /api/students/{id}/photo`
pub async fn get_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = StudentId::new(id);
    let photo = with_store(&state, move |store| store.get_photo(&id))
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok((
        [(header::CONTENT_TYPE, photo.content_type)],
        Bytes::from(photo.bytes),
    ))
}

// =============================================================================
// LOOKUP TABLES
// =============================================================================

/// `GET /api/specializations`
pub async fn list_specializations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Specialization>>, ApiError> {
    Ok(Json(with_store(&state, StudentStore::specializations).await?))
}

/// `GET /api/subjects`
pub async fn list_subjects(
    State(state): State<AppState>,
) -> Result<Json<Vec<Subject>>, ApiError> {
    Ok(Json(with_store(&state, StudentStore::subjects).await?))
}

/// `GET /api/exam-centers`
pub async fn list_exam_centers(
    State(state): State<AppState>,
) -> Result<Json<Vec<ExamCenter>>, ApiError> {
    Ok(Json(with_store(&state, StudentStore::exam_centers).await?))
}

// =============================================================================
// TESTS
// =============================================================================
