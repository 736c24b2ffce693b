use std::path::PathBuf;

use serde::Deserialize;

/// Which blob store implementation backs uploads.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Files under a local uploads directory, served by the app itself.
    #[default]
    Local,
    /// Cloudinary hosted image service.
    Cloudinary,
}

/// Local-disk storage settings.
#[derive(Debug, Deserialize, Clone)]
pub struct LocalStorageConfig {
    /// Directory uploads are written to. Default: "uploads".
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,
    /// URL prefix the uploads directory is served under. Default: "/uploads".
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("uploads")
}
fn default_public_prefix() -> String {
    "/uploads".into()
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            uploads_dir: default_uploads_dir(),
            public_prefix: default_public_prefix(),
        }
    }
}

/// Cloudinary credentials and upload target.
#[derive(Debug, Deserialize, Clone)]
pub struct CloudinaryConfig {
    #[serde(default)]
    pub cloud_name: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    /// Logical folder every upload lands in. Default: "tattoos".
    #[serde(default = "default_folder")]
    pub folder: String,
    /// API root, overridable for tests. Default: "https://api.cloudinary.com/v1_1".
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_folder() -> String {
    "tattoos".into()
}
fn default_api_base() -> String {
    "https://api.cloudinary.com/v1_1".into()
}

impl Default for CloudinaryConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            folder: default_folder(),
            api_base: default_api_base(),
        }
    }
}

impl CloudinaryConfig {
    /// Names of the credential settings that are empty.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        [
            ("cloud_name", &self.cloud_name),
            ("api_key", &self.api_key),
            ("api_secret", &self.api_secret),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// App-level blob storage configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageAppConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default)]
    pub local: LocalStorageConfig,
    #[serde(default)]
    pub cloudinary: CloudinaryConfig,
}
