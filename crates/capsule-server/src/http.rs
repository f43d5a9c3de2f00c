//! HTTP routes.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use capsule_core::{CompilationResult, FieldError, ProjectSpec};
use capsule_export::{ExportError, ExportService, ExportStatus, InMemoryBlobStorage};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ExportService>,
    pub blobs: Arc<InMemoryBlobStorage>,
}

/// Error responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 with field-level detail.
    Validation(Vec<FieldError>),
    NotFound(String),
    Internal(String),
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Validation(details) => Self::Validation(details),
            ExportError::ProjectNotFound(_) => Self::NotFound(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(details) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "validation_failed", "details": details })),
            )
                .into_response(),
            Self::NotFound(message) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "not_found", "message": message })),
            )
                .into_response(),
            Self::Internal(message) => {
                error!(%message, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal_error", "message": message })),
                )
                    .into_response()
            }
        }
    }
}

fn body_error(rejection: JsonRejection) -> ApiError {
    ApiError::Validation(vec![FieldError::new("body", rejection.body_text())])
}

/// Inline generation response.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub platforms: Vec<CompilationResult>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/projects/:id/export", post(export_project))
        .route("/v1/generate", post(generate))
        .route("/v1/blobs/*key", get(download_blob))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// Run blocking pipeline work off the async executor.
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ExportError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("worker failed: {e}")))?
        .map_err(ApiError::from)
}

async fn export_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body.map_err(body_error)?;

    let service = state.service.clone();
    let outcome = blocking(move || service.export(&id, &request)).await?;

    let status = match outcome.status {
        ExportStatus::Ok => StatusCode::OK,
        ExportStatus::AllFailed => StatusCode::INTERNAL_SERVER_ERROR,
    };
    Ok((status, Json(outcome.response)).into_response())
}

async fn generate(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(raw) = body.map_err(body_error)?;
    let project: ProjectSpec = serde_json::from_value(raw)
        .map_err(|e| ApiError::Validation(vec![FieldError::new("body", e.to_string())]))?;

    let service = state.service.clone();
    let platforms = blocking(move || service.generate_inline(&project)).await?;

    let success = platforms.iter().all(|r| r.success);
    let status = if platforms.iter().any(|r| r.success) {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    Ok((status, Json(GenerateResponse { success, platforms })).into_response())
}

async fn download_blob(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    let bytes = state
        .blobs
        .get(&key)
        .ok_or_else(|| ApiError::NotFound(format!("blob '{key}' not found")))?;
    let name = key.rsplit('/').next().unwrap_or(key.as_str());

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{name}\"")),
        ],
        Body::from(bytes),
    )
        .into_response())
}
