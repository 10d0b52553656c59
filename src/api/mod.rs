//! HTTP API: thin axum layer over the core components.
//!
//! Provides `AppState` (shared state) and the router wiring; all request
//! handling lives in [`routes`].
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::answer::{AnswerError, AnswerPipeline};
use crate::audit::AuditLog;
use crate::repository::DocumentRepository;

/// Shared application state available to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AnswerPipeline>,
    pub repository: Arc<DocumentRepository>,
    pub audit: Arc<AuditLog>,
}

/// Build the application router with CORS restricted to the configured
/// origins.
pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::service_info))
        .route("/search", post(routes::search))
        .route("/suggest", get(routes::suggest))
        .route("/feedback", post(routes::feedback))
        .route("/stats", get(routes::stats))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

/// Error shape returned by handlers.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl From<AnswerError> for ApiError {
    fn from(err: AnswerError) -> Self {
        match err {
            AnswerError::QueryTooShort => Self::BadRequest(err.to_string()),
            AnswerError::Internal(e) => Self::Internal(format!("{e:#}")),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            Self::Internal(detail) => {
                tracing::error!("Request failed: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, axum::Json(json!({ "detail": detail }))).into_response()
    }
}
