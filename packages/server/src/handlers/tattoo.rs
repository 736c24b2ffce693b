use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::storage::{ACCEPTED_EXTENSIONS, ACCEPTED_IMAGE_TYPES, MAX_IMAGE_BYTES};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{AppError, ErrorBody};
use crate::ingest::{self, read_submission, validate};
use crate::models::tattoo::{
    CreateTattooResponse, DeleteTattooResponse, TattooResponse, UploadConfigResponse,
};
use crate::state::AppState;

/// Room for the text fields and multipart framing on top of the image itself.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

pub fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(MAX_IMAGE_BYTES as usize + MULTIPART_OVERHEAD)
}

#[utoipa::path(
    post,
    path = "/tattoos",
    tag = "Tattoos",
    operation_id = "createTattoo",
    summary = "Submit a tattoo",
    description = "Uploads an image together with price, duration and tags. \
        Fields: `image` (file, required), `price` (required, >= 0), exactly one of \
        `duration` / `timeInHours` (hours) or `timeInMinutes`, and `tags` \
        (comma-separated, optional). Fields are validated in the order image, \
        price, duration; the first failure is reported.",
    request_body(content_type = "multipart/form-data", description = "Tattoo submission form"),
    responses(
        (status = 201, description = "Record created", body = CreateTattooResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 500, description = "Storage or database failure (STORAGE_ERROR, PERSISTENCE_ERROR)", body = ErrorBody),
        (status = 503, description = "Database not connected (DATABASE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn create_tattoo(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let raw = read_submission(multipart).await?;
    let submission = validate(raw)?;
    let record = ingest::ingest(&*state.blobs, &*state.records, submission).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTattooResponse {
            success: true,
            record: record.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/tattoos",
    tag = "Tattoos",
    operation_id = "listTattoos",
    summary = "List all tattoos",
    description = "Returns every record, newest first.",
    responses(
        (status = 200, description = "All records", body = Vec<TattooResponse>),
        (status = 500, description = "Database failure (PERSISTENCE_ERROR)", body = ErrorBody),
        (status = 503, description = "Database not connected (DATABASE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_tattoos(
    State(state): State<AppState>,
) -> Result<Json<Vec<TattooResponse>>, AppError> {
    let records = state.records.list_all().await?;
    Ok(Json(records.into_iter().map(TattooResponse::from).collect()))
}

#[utoipa::path(
    delete,
    path = "/tattoos/{id}",
    tag = "Tattoos",
    operation_id = "deleteTattoo",
    summary = "Delete a tattoo",
    description = "Deletes the record, then removes its image from storage unless another \
        record still references it. Image removal is best effort: a failure is logged \
        and reported as `image_removed: false`.",
    params(("id" = String, Path, description = "Record ID (UUID)")),
    responses(
        (status = 200, description = "Record deleted", body = DeleteTattooResponse),
        (status = 400, description = "Malformed ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "No such record (NOT_FOUND)", body = ErrorBody),
        (status = 503, description = "Database not connected (DATABASE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn delete_tattoo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteTattooResponse>, AppError> {
    let id = Uuid::parse_str(id.trim())
        .map_err(|_| AppError::field("id", format!("'{id}' is not a valid record id")))?;

    let record = state
        .records
        .delete_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tattoo {id} not found")))?;
    info!(record_id = %id, "Deleted tattoo record");

    let shared = match state.records.list_all().await {
        Ok(rest) => rest.iter().any(|r| r.image_ref == record.image_ref),
        Err(e) => {
            warn!(record_id = %id, error = %e, "Could not check for other references, keeping image");
            true
        }
    };

    let image_removed = if shared {
        false
    } else {
        match state.blobs.delete(&record.image_ref).await {
            Ok(removed) => removed,
            Err(e) => {
                warn!(record_id = %id, image_ref = %record.image_ref, error = %e, "Failed to remove image");
                false
            }
        }
    };

    Ok(Json(DeleteTattooResponse {
        success: true,
        id: id.to_string(),
        image_removed,
    }))
}

#[utoipa::path(
    get,
    path = "/upload-config",
    tag = "Tattoos",
    operation_id = "getUploadConfig",
    summary = "Upload constraints",
    description = "Size limit and accepted formats, so clients can pre-check files with the \
        same numbers the server enforces.",
    responses(
        (status = 200, description = "Upload constraints", body = UploadConfigResponse),
    ),
)]
pub async fn upload_config(State(state): State<AppState>) -> Json<UploadConfigResponse> {
    Json(UploadConfigResponse {
        max_image_bytes: MAX_IMAGE_BYTES,
        accepted_types: ACCEPTED_IMAGE_TYPES.iter().map(|s| s.to_string()).collect(),
        accepted_extensions: ACCEPTED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        duration_unit: "hours".into(),
        storage: state.blobs.kind().as_str().into(),
    })
}
