use std::sync::Arc;

use sea_orm::{ConnectionTrait, DbBackend, Statement};
use server::store::{NewTattoo, PgRecordStore, RecordStore, StoreError};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::harness::fresh_db;

fn new_tattoo(image_ref: &str, price: f64) -> NewTattoo {
    NewTattoo {
        image_ref: image_ref.into(),
        price,
        duration: 2.5,
        tags: vec!["line work".into(), "color".into()],
    }
}

#[tokio::test]
async fn insert_round_trips_all_fields() {
    let (db, _) = fresh_db().await;
    let store = PgRecordStore::connected(db);

    let created = store.insert(new_tattoo("/uploads/a.jpg", 150.0)).await.unwrap();
    assert_eq!(created.image_ref, "/uploads/a.jpg");
    assert_eq!(created.price, 150.0);
    assert_eq!(created.duration, 2.5);
    assert_eq!(created.tags, vec!["line work", "color"]);

    let listed = store.list_all().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);
    assert_eq!(listed[0].tags, created.tags);
}

#[tokio::test]
async fn list_is_newest_first() {
    let (db, _) = fresh_db().await;
    let store = PgRecordStore::connected(db);

    let mut ids = Vec::new();
    for i in 0..4 {
        let record = store.insert(new_tattoo(&format!("/uploads/{i}.jpg"), i as f64)).await.unwrap();
        ids.push(record.id);
    }

    let listed = store.list_all().await.unwrap();
    assert!(listed.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    let listed_ids: Vec<Uuid> = listed.iter().map(|r| r.id).collect();
    ids.reverse();
    assert_eq!(listed_ids, ids);
}

#[tokio::test]
async fn delete_returns_removed_record_once() {
    let (db, _) = fresh_db().await;
    let store = PgRecordStore::connected(db);
    let keep = store.insert(new_tattoo("/uploads/keep.jpg", 1.0)).await.unwrap();
    let gone = store.insert(new_tattoo("/uploads/gone.jpg", 2.0)).await.unwrap();

    let removed = store.delete_by_id(gone.id).await.unwrap();
    assert_eq!(removed.map(|r| r.image_ref), Some("/uploads/gone.jpg".to_string()));
    assert!(store.delete_by_id(gone.id).await.unwrap().is_none());
    assert!(store.delete_by_id(Uuid::now_v7()).await.unwrap().is_none());

    let listed = store.list_all().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, keep.id);
}

#[tokio::test]
async fn created_at_index_exists() {
    let (db, _) = fresh_db().await;
    let row = db
        .query_one_raw(Statement::from_string(
            DbBackend::Postgres,
            "SELECT COUNT(*)::int4 AS n FROM pg_indexes WHERE indexname = 'idx_tattoo_created_at'"
                .to_string(),
        ))
        .await
        .unwrap()
        .unwrap();
    let n: i32 = row.try_get("", "n").unwrap();
    assert_eq!(n, 1);
}

#[tokio::test]
async fn unconnected_store_is_unavailable() {
    let store = PgRecordStore::new(Arc::new(OnceCell::new()));
    assert!(matches!(store.ping().await, Err(StoreError::Unavailable)));
    assert!(matches!(store.list_all().await, Err(StoreError::Unavailable)));
}
