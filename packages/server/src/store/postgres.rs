use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use tokio::sync::OnceCell;
use uuid::Uuid;

use super::{NewTattoo, RecordStore, StoreError, TattooRecord};
use crate::entity::tattoo;

/// Record store backed by Postgres through sea-orm.
///
/// The connection is filled in by the background connect task; until then
/// every operation fails with [`StoreError::Unavailable`].
#[derive(Clone)]
pub struct PgRecordStore {
    conn: Arc<OnceCell<DatabaseConnection>>,
}

impl PgRecordStore {
    pub fn new(conn: Arc<OnceCell<DatabaseConnection>>) -> Self {
        Self { conn }
    }

    /// A store over an already established connection.
    pub fn connected(db: DatabaseConnection) -> Self {
        Self {
            conn: Arc::new(OnceCell::new_with(Some(db))),
        }
    }

    fn db(&self) -> Result<&DatabaseConnection, StoreError> {
        self.conn.get().ok_or(StoreError::Unavailable)
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, new: NewTattoo) -> Result<TattooRecord, StoreError> {
        let db = self.db()?;

        let model = tattoo::ActiveModel {
            id: Set(Uuid::now_v7()),
            image_ref: Set(new.image_ref),
            price: Set(new.price),
            duration: Set(new.duration),
            tags: Set(serde_json::json!(new.tags)),
            created_at: Set(Utc::now()),
        };

        let saved = model.insert(db).await?;
        TattooRecord::try_from(saved)
    }

    async fn list_all(&self) -> Result<Vec<TattooRecord>, StoreError> {
        let db = self.db()?;

        tattoo::Entity::find()
            .order_by_desc(tattoo::Column::CreatedAt)
            .order_by_desc(tattoo::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(TattooRecord::try_from)
            .collect()
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<TattooRecord>, StoreError> {
        let db = self.db()?;

        let Some(existing) = tattoo::Entity::find_by_id(id).one(db).await? else {
            return Ok(None);
        };

        let result = tattoo::Entity::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            return Ok(None);
        }

        TattooRecord::try_from(existing).map(Some)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db()?.ping().await?;
        Ok(())
    }
}
