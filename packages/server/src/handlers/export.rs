use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use chrono::Utc;
use tracing::{info, instrument};

use crate::error::AppError;
use crate::models::tattoo::TattooResponse;
use crate::state::AppState;

/// Attachment name for an export taken on the given UTC date.
pub fn export_file_name(date: chrono::NaiveDate) -> String {
    format!("tattoo-data-{}.json", date.format("%Y-%m-%d"))
}

/// Full record set as a downloadable JSON file.
#[instrument(skip(state))]
pub async fn download_data(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let records: Vec<TattooResponse> = state
        .records
        .list_all()
        .await?
        .into_iter()
        .map(TattooResponse::from)
        .collect();
    info!(count = records.len(), "Exporting tattoo records");

    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(Utc::now().date_naive())
    );
    Ok(([(header::CONTENT_DISPOSITION, disposition)], Json(records)))
}
