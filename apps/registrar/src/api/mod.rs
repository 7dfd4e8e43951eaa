//! # HTTP API
//!
//! axum router over a shared [`StudentStore`].
//!
//! ```text
//! GET    /health
//! POST   /api/students
//! GET    /api/students
//! GET    /api/students/{id}
//! PUT    /api/students/{id}
//! DELETE /api/students/{id}
//! PUT    /api/students/{id}/photo
//! GET    /api/students/{id}/photo
//! GET    /api/specializations
//! GET    /api/subjects
//! GET    /api/exam-centers
//! ```

pub mod error;
pub mod handlers;
pub mod types;

pub use error::ApiError;

use crate::config::ServerConfig;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use registrar_core::StudentStore;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<StudentStore>,
}

impl AppState {
    #[must_use]
    pub fn new(store: StudentStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// Build the application router with its middleware stack.
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let router = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/students",
            get(handlers::list_students).post(handlers::register_student),
        )
        .route(
            "/api/students/{id}",
            get(handlers::get_student)
                .put(handlers::update_student)
                .delete(handlers::delete_student),
        )
        .route(
            "/api/students/{id}/photo",
            get(handlers::get_photo).put(handlers::upload_photo),
        )
        .route("/api/specializations", get(handlers::list_specializations))
        .route("/api/subjects", get(handlers::list_subjects))
        .route("/api/exam-centers", get(handlers::list_exam_centers))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if config.cors_enabled() {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Bind, serve until Ctrl+C, then drain in-flight requests.
pub async fn serve(store: StudentStore, config: &ServerConfig) -> std::io::Result<()> {
    let app = create_router(AppState::new(store), config);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        backend = ?config.backend,
        "Registrar listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("Received Ctrl+C, initiating shutdown...");
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use registrar_core::MemoryBackend;
    use tower::ServiceExt;

    fn app() -> Router {
        let state = AppState::new(StudentStore::new(MemoryBackend::new()));
        create_router(state, &ServerConfig::default())
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let response = app()
            .oneshot(Request::get("/api/courses").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn wrong_verb_is_405() {
        let response = app()
            .oneshot(
                Request::patch("/api/students/abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
