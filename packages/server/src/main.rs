use std::sync::Arc;

use anyhow::Context;
use common::storage::build_blob_store;
use tokio::sync::OnceCell;
use tracing::{Level, info, warn};

use server::config::AppConfig;
use server::database::spawn_connect;
use server::state::AppState;
use server::store::PgRecordStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    for missing in config.missing_settings() {
        warn!("{}", missing);
    }

    let blobs = build_blob_store(&config.storage)
        .await
        .context("Failed to initialize blob storage")?;
    info!(backend = blobs.kind().as_str(), "Blob storage ready");

    let conn = Arc::new(OnceCell::new());
    let records = Arc::new(PgRecordStore::new(conn.clone()));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    if config.database.url.trim().is_empty() {
        warn!("No database configured; record operations will return 503");
    } else {
        spawn_connect(config.database.clone(), conn);
    }

    let state = AppState {
        config: Arc::new(config),
        blobs,
        records,
    };
    let app = server::build_router(state);

    axum::serve(listener, app).await?;

    Ok(())
}
