//! In-process fakes and an HTTP harness for handler tests.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use common::storage::filesystem::LocalBlobStore;
use common::storage::{BlobStore, MAX_IMAGE_BYTES};
use reqwest::Client;
use serde_json::Value;
use uuid::Uuid;

use crate::config::{AppConfig, CorsConfig, DatabaseConfig, ServerConfig};
use crate::state::AppState;
use crate::store::{NewTattoo, RecordStore, StoreError, TattooRecord};

/// Record store held in memory. `failing()` rejects every insert and
/// `offline()` behaves like a database that never connected.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: Mutex<Vec<TattooRecord>>,
    fail_inserts: bool,
    offline: bool,
}

impl MemoryRecordStore {
    pub fn failing() -> Self {
        Self {
            fail_inserts: true,
            ..Self::default()
        }
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    /// Insert a record as-is, bypassing id and timestamp assignment.
    pub fn seed(&self, record: TattooRecord) {
        self.records.lock().unwrap().push(record);
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, new: NewTattoo) -> Result<TattooRecord, StoreError> {
        if self.offline {
            return Err(StoreError::Unavailable);
        }
        if self.fail_inserts {
            return Err(StoreError::Database(sea_orm::DbErr::Custom(
                "insert rejected by test store".into(),
            )));
        }
        let mut records = self.records.lock().unwrap();
        // Keep timestamps strictly increasing so ordering is deterministic.
        let mut created_at = Utc::now();
        if let Some(latest) = records.iter().map(|r| r.created_at).max()
            && created_at <= latest
        {
            created_at = latest + Duration::microseconds(1);
        }
        let record = TattooRecord {
            id: Uuid::now_v7(),
            image_ref: new.image_ref,
            price: new.price,
            duration: new.duration,
            tags: new.tags,
            created_at,
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<TattooRecord>, StoreError> {
        if self.offline {
            return Err(StoreError::Unavailable);
        }
        let mut records = self.records.lock().unwrap().clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<TattooRecord>, StoreError> {
        if self.offline {
            return Err(StoreError::Unavailable);
        }
        let mut records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .position(|r| r.id == id)
            .map(|idx| records.remove(idx)))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.offline {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

pub fn record(image_ref: &str, minutes_ago: i64) -> TattooRecord {
    TattooRecord {
        id: Uuid::now_v7(),
        image_ref: image_ref.into(),
        price: 100.0,
        duration: 1.0,
        tags: vec![],
        created_at: Utc::now() - Duration::minutes(minutes_ago),
    }
}

pub fn test_config(root: &std::path::Path) -> AppConfig {
    let mut config = AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            public_dir: root.join("public"),
            cors: CorsConfig::default(),
        },
        database: DatabaseConfig::default(),
        storage: Default::default(),
    };
    config.storage.local.uploads_dir = root.join("uploads");
    config
}

/// A router served on a random local port, backed by a temp uploads
/// directory and the given record store.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub blobs: Arc<LocalBlobStore>,
    pub records: Arc<MemoryRecordStore>,
    pub uploads_dir: PathBuf,
    state: AppState,
    _dir: tempfile::TempDir,
}

pub struct TestResponse {
    pub status: u16,
    pub headers: reqwest::header::HeaderMap,
    pub text: String,
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(MemoryRecordStore::default()).await
    }

    pub async fn spawn_with(records: MemoryRecordStore) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        std::fs::create_dir_all(&config.server.public_dir).unwrap();
        std::fs::write(
            config.server.public_dir.join("index.html"),
            "<html><body>front end</body></html>",
        )
        .unwrap();

        let uploads_dir = config.storage.local.uploads_dir.clone();
        let blobs = Arc::new(
            LocalBlobStore::new(uploads_dir.clone(), "/uploads", MAX_IMAGE_BYTES)
                .await
                .unwrap(),
        );
        let records = Arc::new(records);

        let state = AppState {
            config: Arc::new(config),
            blobs: blobs.clone() as Arc<dyn BlobStore>,
            records: records.clone() as Arc<dyn RecordStore>,
        };
        let app = crate::build_router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            blobs,
            records,
            uploads_dir,
            state,
            _dir: dir,
        }
    }

    /// Shared state the served router was built from.
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self.client.get(self.url(path)).send().await.unwrap();
        TestResponse::from_response(res).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        let res = self.client.delete(self.url(path)).send().await.unwrap();
        TestResponse::from_response(res).await
    }

    pub async fn post_form(&self, path: &str, form: reqwest::multipart::Form) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .unwrap();
        TestResponse::from_response(res).await
    }

    /// Files currently in the uploads directory, dotfiles excluded.
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.uploads_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|n| !n.starts_with('.'))
            .collect();
        names.sort();
        names
    }
}

/// Multipart form for a tattoo submission with a small JPEG part.
pub fn tattoo_form(price: &str, duration: &str, tags: &str) -> reqwest::multipart::Form {
    let image = reqwest::multipart::Part::bytes(b"\xff\xd8\xff\xe0fake jpeg".to_vec())
        .file_name("photo.jpg")
        .mime_str("image/jpeg")
        .unwrap();
    reqwest::multipart::Form::new()
        .part("image", image)
        .text("price", price.to_string())
        .text("duration", duration.to_string())
        .text("tags", tags.to_string())
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self {
            status,
            headers,
            text,
            body,
        }
    }
}
