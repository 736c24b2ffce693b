pub mod config;
pub mod retry;
pub mod storage;

pub use config::{CloudinaryConfig, LocalStorageConfig, StorageAppConfig, StorageBackend};
