use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use tracing::{instrument, warn};

use crate::error::{AppError, ErrorBody};
use crate::models::diagnostics::{HealthResponse, ServerFilesResponse};
use crate::pages::render_uploads_browser;
use crate::reconcile::inspect;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/server-files",
    tag = "Diagnostics",
    operation_id = "listServerFiles",
    summary = "Reconcile stored files against records",
    description = "Lists every stored image with the records referencing it, plus records \
        whose image is missing. Read-only. When the storage backend cannot be enumerated \
        (`enumerable: false`) the file list is derived from record references.",
    responses(
        (status = 200, description = "Reconciliation report", body = ServerFilesResponse),
        (status = 500, description = "Storage or database failure (STORAGE_ERROR, PERSISTENCE_ERROR)", body = ErrorBody),
        (status = 503, description = "Database not connected (DATABASE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn server_files(
    State(state): State<AppState>,
) -> Result<Json<ServerFilesResponse>, AppError> {
    let report = inspect(&*state.blobs, &*state.records).await?;
    Ok(Json(report))
}

#[instrument(skip(state))]
pub async fn uploads_browser(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let report = inspect(&*state.blobs, &*state.records).await?;
    Ok(Html(render_uploads_browser(&report)))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let storage = state.blobs.kind().as_str();
    match state.records.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                database: "connected",
                storage,
            }),
        ),
        Err(e) => {
            warn!(error = %e, "Health check: database not ready");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "degraded",
                    database: "unavailable",
                    storage,
                }),
            )
        }
    }
}
