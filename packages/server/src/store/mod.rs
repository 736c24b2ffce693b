pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::entity::tattoo;

pub use postgres::PgRecordStore;

/// A stored tattoo submission.
#[derive(Debug, Clone, PartialEq)]
pub struct TattooRecord {
    pub id: Uuid,
    pub image_ref: String,
    pub price: f64,
    /// Hours.
    pub duration: f64,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the ingestion pipeline; id and timestamp are assigned
/// by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTattoo {
    pub image_ref: String,
    pub price: f64,
    pub duration: f64,
    pub tags: Vec<String>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database connection is not established")]
    Unavailable,

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("record {id} is malformed: {reason}")]
    Corrupt { id: Uuid, reason: String },
}

/// Persistent collection of tattoo records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a record, assigning its id and creation time.
    async fn insert(&self, new: NewTattoo) -> Result<TattooRecord, StoreError>;

    /// All records, newest first (`created_at` desc, then `id` desc).
    async fn list_all(&self) -> Result<Vec<TattooRecord>, StoreError>;

    /// Delete a record. Returns the removed record, or `None` if no record
    /// had that id.
    async fn delete_by_id(&self, id: Uuid) -> Result<Option<TattooRecord>, StoreError>;

    /// Check that the backing database is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

impl TryFrom<tattoo::Model> for TattooRecord {
    type Error = StoreError;

    fn try_from(model: tattoo::Model) -> Result<Self, Self::Error> {
        let tags: Vec<String> =
            serde_json::from_value(model.tags).map_err(|e| StoreError::Corrupt {
                id: model.id,
                reason: format!("tags: {e}"),
            })?;

        Ok(Self {
            id: model.id,
            image_ref: model.image_ref,
            price: model.price,
            duration: model.duration,
            tags,
            created_at: model.created_at,
        })
    }
}
