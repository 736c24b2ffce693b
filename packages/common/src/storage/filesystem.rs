use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::error::StorageError;
use super::image::{blob_name_from_ref, check_image, generate_blob_stem};
use super::traits::{BlobEntry, BlobStore, ImageUpload, StorageKind, StoredBlob};

/// Filesystem-backed image store.
///
/// Blobs live flat in `{root}/{unix_millis}-{hex}.{ext}` and are referenced
/// as `{public_prefix}/{name}`. Writes go through a staging directory next
/// to the root (`.{root_name}.staging`) and are renamed into place, so a
/// partial image is never inside the served directory. Leftover staging files
/// are cleared when the store is created.
pub struct LocalBlobStore {
    root: PathBuf,
    staging: PathBuf,
    public_prefix: String,
    max_size: u64,
}

impl LocalBlobStore {
    /// Create a new local store, creating the directories it needs.
    pub async fn new(
        root: PathBuf,
        public_prefix: impl Into<String>,
        max_size: u64,
    ) -> Result<Self, StorageError> {
        fs::create_dir_all(&root).await?;

        let staging = staging_dir(&root);
        match fs::remove_dir_all(&staging).await {
            Ok(()) => debug!(path = %staging.display(), "Cleared stale staging directory"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        fs::create_dir_all(&staging).await?;

        let public_prefix = public_prefix.into().trim_end_matches('/').to_string();
        Ok(Self {
            root,
            staging,
            public_prefix,
            max_size,
        })
    }

    /// Directory blobs are written to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn public_url(&self, name: &str) -> String {
        format!("{}/{}", self.public_prefix, name)
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.staging.join(uuid::Uuid::new_v4().to_string())
    }

    /// Map an image reference to a path inside the root, refusing anything
    /// that could escape it.
    fn resolve(&self, image_ref: &str) -> Result<PathBuf, StorageError> {
        let name = blob_name_from_ref(image_ref)
            .ok_or_else(|| StorageError::InvalidReference(image_ref.to_string()))?;
        if name.starts_with('.') || name.contains('\\') || name.contains('\0') {
            return Err(StorageError::InvalidReference(image_ref.to_string()));
        }
        Ok(self.root.join(name))
    }
}

/// Sibling of `root`, so it shares the filesystem (for `rename`) but is not
/// served with it.
fn staging_dir(root: &Path) -> PathBuf {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "uploads".to_string());
    root.with_file_name(format!(".{name}.staging"))
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn kind(&self) -> StorageKind {
        StorageKind::Local
    }

    async fn put(&self, upload: ImageUpload<'_>) -> Result<StoredBlob, StorageError> {
        let ext = check_image(&upload, self.max_size)?;
        let name = format!("{}.{ext}", generate_blob_stem());
        let blob_path = self.root.join(&name);

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, upload.data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &blob_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        debug!(name = %name, size = upload.data.len(), "Stored image on disk");

        Ok(StoredBlob {
            image_ref: self.public_url(&name),
            name,
            size: upload.data.len() as u64,
        })
    }

    async fn list(&self) -> Result<Option<Vec<BlobEntry>>, StorageError> {
        let mut entries = Vec::new();
        let mut dir = fs::read_dir(&self.root).await?;

        while let Some(entry) = dir.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            entries.push(BlobEntry {
                url: self.public_url(&name),
                name,
                size: Some(meta.len()),
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Some(entries))
    }

    async fn delete(&self, image_ref: &str) -> Result<bool, StorageError> {
        let blob_path = self.resolve(image_ref)?;
        match fs::remove_file(&blob_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
