use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::store::TattooRecord;

/// Response DTO for a single tattoo record.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TattooResponse {
    /// Record ID (UUIDv7).
    #[schema(example = "01936f0e-1234-7abc-8000-000000000001")]
    pub id: String,
    /// Public path or URL of the stored image.
    #[schema(example = "/uploads/1712345678901-3fa2c1d0.jpg")]
    pub image_ref: String,
    #[schema(example = 150.0)]
    pub price: f64,
    /// Duration in hours.
    #[schema(example = 2.5)]
    pub duration: f64,
    #[schema(example = json!(["line work", "color"]))]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<TattooRecord> for TattooResponse {
    fn from(record: TattooRecord) -> Self {
        Self {
            id: record.id.to_string(),
            image_ref: record.image_ref,
            price: record.price,
            duration: record.duration,
            tags: record.tags,
            created_at: record.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CreateTattooResponse {
    pub success: bool,
    pub record: TattooResponse,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DeleteTattooResponse {
    pub success: bool,
    pub id: String,
    /// Whether the referenced image was removed from storage as well.
    pub image_removed: bool,
}

/// Upload constraints the front end checks before submitting.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadConfigResponse {
    #[schema(example = 5242880)]
    pub max_image_bytes: u64,
    pub accepted_types: Vec<String>,
    pub accepted_extensions: Vec<String>,
    #[schema(example = "hours")]
    pub duration_unit: String,
    /// Active blob store backend.
    #[schema(example = "local")]
    pub storage: String,
}
