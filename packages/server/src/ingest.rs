//! Upload-and-persist pipeline.
//!
//! A submission is read from multipart form data, validated field by field
//! (image, then price, then duration), written to the blob store, and finally
//! recorded. Validation happens before any side effect. If the record insert
//! fails after the image was stored, the image is deleted again; a failed
//! compensation leaves an orphan that reconciliation reports.

use axum::extract::Multipart;
use common::storage::{BlobStore, ImageUpload, MAX_IMAGE_BYTES, StorageError, image::check_image};
use thiserror::Error;
use tracing::{info, warn};

use crate::store::{NewTattoo, RecordStore, StoreError, TattooRecord};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("{message}")]
    Invalid {
        field: &'static str,
        message: String,
    },

    #[error("failed to store image: {0}")]
    Storage(#[from] StorageError),

    #[error("failed to save record: {0}")]
    Persistence(#[from] StoreError),
}

impl IngestError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        IngestError::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// Unit a submitted duration field is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Hours,
    Minutes,
}

impl DurationUnit {
    /// Map a form field name to the unit it carries.
    pub fn from_field(name: &str) -> Option<Self> {
        match name {
            "duration" | "timeInHours" => Some(Self::Hours),
            "timeInMinutes" => Some(Self::Minutes),
            _ => None,
        }
    }

    fn to_hours(self, value: f64) -> f64 {
        match self {
            Self::Hours => value,
            Self::Minutes => value / 60.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImagePart {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl ImagePart {
    fn as_upload(&self) -> ImageUpload<'_> {
        ImageUpload {
            file_name: &self.file_name,
            content_type: self.content_type.as_deref(),
            data: &self.data,
        }
    }
}

/// Form contents as received, before validation.
#[derive(Debug, Clone, Default)]
pub struct RawSubmission {
    pub image: Option<ImagePart>,
    pub price: Option<String>,
    pub durations: Vec<(DurationUnit, String)>,
    pub tags: Option<String>,
}

/// A submission that passed validation.
#[derive(Debug, Clone)]
pub struct ValidSubmission {
    pub image: ImagePart,
    pub price: f64,
    /// Hours.
    pub duration: f64,
    pub tags: Vec<String>,
}

/// Read the multipart body, enforcing the image size limit while streaming.
pub async fn read_submission(mut multipart: Multipart) -> Result<RawSubmission, IngestError> {
    let mut raw = RawSubmission::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| IngestError::invalid("body", format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                if raw.image.is_some() {
                    return Err(IngestError::invalid("image", "Only one image may be uploaded"));
                }
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(|s| s.to_string());

                let mut data = Vec::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| IngestError::invalid("image", format!("Upload read error: {e}")))?
                {
                    if (data.len() + chunk.len()) as u64 > MAX_IMAGE_BYTES {
                        return Err(IngestError::invalid(
                            "image",
                            format!("Image exceeds the maximum size of {MAX_IMAGE_BYTES} bytes"),
                        ));
                    }
                    data.extend_from_slice(&chunk);
                }

                raw.image = Some(ImagePart {
                    file_name,
                    content_type,
                    data,
                });
            }
            "price" | "tags" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| IngestError::invalid("body", format!("Failed to read {name}: {e}")))?;
                if name == "price" {
                    raw.price = Some(text);
                } else {
                    raw.tags = Some(text);
                }
            }
            other => {
                if let Some(unit) = DurationUnit::from_field(other) {
                    let text = field.text().await.map_err(|e| {
                        IngestError::invalid("duration", format!("Failed to read {other}: {e}"))
                    })?;
                    raw.durations.push((unit, text));
                }
                // Unknown fields are ignored.
            }
        }
    }

    Ok(raw)
}

/// Validate a raw submission in field order: image, price, duration.
pub fn validate(raw: RawSubmission) -> Result<ValidSubmission, IngestError> {
    let image = raw
        .image
        .ok_or_else(|| IngestError::invalid("image", "An image file is required"))?;
    if image.data.is_empty() {
        return Err(IngestError::invalid("image", "The image file is empty"));
    }
    check_image(&image.as_upload(), MAX_IMAGE_BYTES)
        .map_err(|e| IngestError::invalid("image", e.to_string()))?;

    let price = parse_non_negative("price", raw.price.as_deref())?;

    let duration = match raw.durations.as_slice() {
        [] => return Err(IngestError::invalid("duration", "duration is required")),
        [(unit, value)] => unit.to_hours(parse_non_negative("duration", Some(value.as_str()))?),
        _ => {
            return Err(IngestError::invalid(
                "duration",
                "Provide only one of duration, timeInHours, timeInMinutes",
            ));
        }
    };

    Ok(ValidSubmission {
        image,
        price,
        duration,
        tags: parse_tags(raw.tags.as_deref().unwrap_or_default()),
    })
}

fn parse_non_negative(field: &'static str, raw: Option<&str>) -> Result<f64, IngestError> {
    let text = raw.map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return Err(IngestError::invalid(field, format!("{field} is required")));
    }
    let value: f64 = text
        .parse()
        .map_err(|_| IngestError::invalid(field, format!("{field} must be a number")))?;
    if !value.is_finite() {
        return Err(IngestError::invalid(field, format!("{field} must be a finite number")));
    }
    if value < 0.0 {
        return Err(IngestError::invalid(field, format!("{field} must not be negative")));
    }
    // Adding +0.0 turns -0.0 into +0.0 and leaves every other value unchanged.
    Ok(value + 0.0)
}

/// Split a comma-separated tag string, trimming each tag and dropping empty
/// ones. Order is preserved.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Store the image, then the record, compensating the image on insert
/// failure.
pub async fn ingest(
    blobs: &dyn BlobStore,
    records: &dyn RecordStore,
    submission: ValidSubmission,
) -> Result<TattooRecord, IngestError> {
    let stored = blobs.put(submission.image.as_upload()).await?;
    info!(image_ref = %stored.image_ref, size = stored.size, "Stored tattoo image");

    let new = NewTattoo {
        image_ref: stored.image_ref.clone(),
        price: submission.price,
        duration: submission.duration,
        tags: submission.tags,
    };

    match records.insert(new).await {
        Ok(record) => {
            info!(record_id = %record.id, image_ref = %record.image_ref, "Created tattoo record");
            Ok(record)
        }
        Err(e) => {
            match blobs.delete(&stored.image_ref).await {
                Ok(_) => warn!(
                    image_ref = %stored.image_ref,
                    "Record insert failed, removed the stored image"
                ),
                Err(cleanup) => warn!(
                    image_ref = %stored.image_ref,
                    error = %cleanup,
                    "Record insert failed and the stored image could not be removed; it is now orphaned"
                ),
            }
            Err(e.into())
        }
    }
}
