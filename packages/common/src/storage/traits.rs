use async_trait::async_trait;
use serde::Serialize;

use super::error::StorageError;

/// An image as received from a client, before it is stored.
#[derive(Debug, Clone, Copy)]
pub struct ImageUpload<'a> {
    /// Filename supplied by the client; only its extension is kept.
    pub file_name: &'a str,
    /// MIME type declared by the client, if any.
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

/// Result of a successful `put`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Locator persisted on the record: a public path or an absolute URL.
    pub image_ref: String,
    /// Final path segment of `image_ref`.
    pub name: String,
    pub size: u64,
}

/// One blob found while enumerating a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobEntry {
    pub name: String,
    pub url: String,
    /// `None` when the backend does not report sizes.
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Local,
    Cloudinary,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Cloudinary => "cloudinary",
        }
    }
}

/// Image blob storage.
///
/// Implementations must reject non-image uploads before touching the backend
/// and report backend failures as non-validation errors.
#[async_trait]
pub trait BlobStore: Send + Sync {
    fn kind(&self) -> StorageKind;

    /// Store an image and return its locator.
    async fn put(&self, upload: ImageUpload<'_>) -> Result<StoredBlob, StorageError>;

    /// Enumerate stored blobs, or `None` if the backend cannot be enumerated.
    async fn list(&self) -> Result<Option<Vec<BlobEntry>>, StorageError>;

    /// Delete the blob an `image_ref` points to.
    ///
    /// Returns `true` if the blob was deleted, `false` if it did not exist.
    async fn delete(&self, image_ref: &str) -> Result<bool, StorageError>;
}
