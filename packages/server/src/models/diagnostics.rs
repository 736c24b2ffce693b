use serde::Serialize;

/// One stored blob and whether any record points at it.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct ServerFile {
    #[schema(example = "1712345678901-3fa2c1d0.jpg")]
    pub name: String,
    #[schema(example = "/uploads/1712345678901-3fa2c1d0.jpg")]
    pub url: String,
    /// Size in bytes, when the backend reports it.
    pub size: Option<u64>,
    pub used: bool,
    /// Records referencing this blob.
    pub record_ids: Vec<String>,
}

/// A record whose image reference names no stored blob.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct MissingFile {
    pub record_id: String,
    pub image_ref: String,
    /// Blob name extracted from `image_ref`, if it has one.
    pub name: Option<String>,
}

/// Cross-reference of stored blobs against records.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct ServerFilesResponse {
    #[schema(example = "local")]
    pub storage: String,
    /// False when the blob list was derived from record references.
    pub enumerable: bool,
    pub total_files: usize,
    pub used_files: usize,
    pub unused_files: usize,
    pub total_records: usize,
    pub files: Vec<ServerFile>,
    pub missing_files: Vec<MissingFile>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: &'static str,
    #[schema(example = "connected")]
    pub database: &'static str,
    #[schema(example = "local")]
    pub storage: &'static str,
}
