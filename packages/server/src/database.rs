use std::sync::Arc;
use std::time::Duration;

use common::retry::{RetryPolicy, retry_with_backoff};
use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::entity::tattoo;

pub async fn init_db(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(db_url.to_owned());

    opt.max_connections(20)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("server::entity::*")
        .sync(&db)
        .await?;
    ensure_indexes(&db).await?;

    Ok(db)
}

/// Ensure the listing index exists.
///
/// Schema sync creates tables and columns only, so the index on
/// `created_at` is created separately.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_tattoo_created_at")
        .table(tattoo::Entity)
        .col(tattoo::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => info!("Ensured index idx_tattoo_created_at exists"),
        Err(e) => warn!("Failed to create index idx_tattoo_created_at: {}", e),
    }

    Ok(())
}

/// Connect in the background with bounded exponential backoff, filling `cell`
/// on success. Until then the record store reports itself unavailable.
pub fn spawn_connect(
    config: DatabaseConfig,
    cell: Arc<OnceCell<DatabaseConnection>>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let policy = RetryPolicy {
            max_attempts: config.connect_max_attempts,
            base_delay_ms: config.connect_base_delay_ms,
            max_delay_ms: config.connect_max_delay_ms,
        };

        match retry_with_backoff(&policy, "database connection", || init_db(&config.url)).await {
            Ok(db) => {
                if cell.set(db).is_err() {
                    warn!("Database connection was already initialized");
                } else {
                    info!("Database connected");
                }
            }
            Err(_) => {
                warn!("Database unavailable; record operations will return 503");
            }
        }
    })
}
