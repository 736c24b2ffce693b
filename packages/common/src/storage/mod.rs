mod error;
mod traits;

#[cfg(feature = "cloudinary")]
pub mod cloudinary;
pub mod filesystem;
pub mod image;

use std::sync::Arc;

pub use error::StorageError;
pub use image::{ACCEPTED_EXTENSIONS, ACCEPTED_IMAGE_TYPES, MAX_IMAGE_BYTES, blob_name_from_ref};
pub use traits::{BlobEntry, BlobStore, ImageUpload, StorageKind, StoredBlob};

use crate::config::{StorageAppConfig, StorageBackend};

/// Build the blob store selected by configuration.
pub async fn build_blob_store(config: &StorageAppConfig) -> Result<Arc<dyn BlobStore>, StorageError> {
    match config.backend {
        StorageBackend::Local => {
            let store = filesystem::LocalBlobStore::new(
                config.local.uploads_dir.clone(),
                config.local.public_prefix.clone(),
                MAX_IMAGE_BYTES,
            )
            .await?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "cloudinary")]
        StorageBackend::Cloudinary => Ok(Arc::new(cloudinary::CloudinaryStore::new(
            config.cloudinary.clone(),
            MAX_IMAGE_BYTES,
        ))),
        #[cfg(not(feature = "cloudinary"))]
        StorageBackend::Cloudinary => Err(StorageError::Provider(
            "built without the `cloudinary` feature".into(),
        )),
    }
}
