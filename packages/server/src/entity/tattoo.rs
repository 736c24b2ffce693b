use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tattoo")]
pub struct Model {
    /// UUIDv7 primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Blob locator returned by the blob store. Not checked against it.
    pub image_ref: String,

    pub price: f64,

    /// Hours.
    pub duration: f64,

    /// Tags stored as a JSON array of strings.
    #[sea_orm(column_type = "JsonBinary")]
    pub tags: Json,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
