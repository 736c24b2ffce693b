use std::sync::Arc;

use common::storage::BlobStore;

use crate::config::AppConfig;
use crate::store::RecordStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub blobs: Arc<dyn BlobStore>,
    pub records: Arc<dyn RecordStore>,
}
