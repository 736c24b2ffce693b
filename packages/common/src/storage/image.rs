use chrono::Utc;
use rand::Rng;

use super::error::StorageError;
use super::traits::ImageUpload;

/// Upload ceiling shared by the server and the browser pre-check (5 MiB).
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

pub const ACCEPTED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Validate that an upload is an accepted image within `max_size`.
///
/// Returns the lower-cased file extension to store the blob under.
pub fn check_image(upload: &ImageUpload<'_>, max_size: u64) -> Result<String, StorageError> {
    let ext = upload
        .file_name
        .rsplit_once('.')
        .map(|(stem, ext)| (stem, ext.to_ascii_lowercase()))
        .filter(|(stem, ext)| !stem.is_empty() && ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
        .map(|(_, ext)| ext)
        .ok_or_else(|| {
            StorageError::UnsupportedType(format!(
                "'{}' does not have an image extension ({})",
                upload.file_name,
                ACCEPTED_EXTENSIONS.join(", ")
            ))
        })?;

    let declared = upload
        .content_type
        .map(normalize_mime)
        .filter(|m| !m.is_empty() && m != "application/octet-stream");
    let mime = match declared {
        Some(m) => m,
        None => mime_guess::from_ext(&ext)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    };
    if !ACCEPTED_IMAGE_TYPES.contains(&mime.as_str()) {
        return Err(StorageError::UnsupportedType(format!(
            "content type '{mime}' is not an accepted image type"
        )));
    }

    let size = upload.data.len() as u64;
    if size > max_size {
        return Err(StorageError::SizeLimitExceeded {
            actual: size,
            limit: max_size,
        });
    }

    Ok(ext)
}

fn normalize_mime(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Generate a collision-resistant blob stem: `{unix_millis}-{8 hex chars}`.
pub fn generate_blob_stem() -> String {
    let suffix: [u8; 4] = rand::rng().random();
    format!("{}-{}", Utc::now().timestamp_millis(), hex::encode(suffix))
}

/// Extract the blob name (final path segment) an `image_ref` points to.
///
/// Query strings and fragments are ignored. Returns `None` for references
/// without a usable final segment.
pub fn blob_name_from_ref(image_ref: &str) -> Option<&str> {
    let path = image_ref
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim();
    let name = path.rsplit('/').next()?;
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name)
}
