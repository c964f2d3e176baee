use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info, warn};

mod api;
mod config;
mod error;
mod gateway;
mod model;
mod registry;
mod service;

use config::Config;
use gateway::{BlobStore, FsBlobStore, MemoryRecordStore, PgRecordStore, RecordStore};
use service::RegistrationService;

async fn record_store(config: &Config) -> Result<Arc<dyn RecordStore>> {
    let Some(database_url) = config.database_url.as_deref() else {
        warn!("DATABASE_URL not set, registrations are kept in memory only");
        return Ok(Arc::new(MemoryRecordStore::new()));
    };

    let pool = gateway::postgres::get_db_pool(
        database_url,
        config.db_max_connections,
        config.db_acquire_timeout,
    )
    .await?;
    info!("✅ Successfully connected to database!");

    let store = PgRecordStore::new(pool)
        .await
        .context("Failed to prepare registrations table")?;
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    if let Err(e) = dotenvy::dotenv() {
        info!("No .env file loaded ({}), using process environment", e);
    }

    let config = Arc::new(Config::from_env().context("Invalid configuration")?);

    let records = record_store(&config).await?;
    let blobs: Arc<dyn BlobStore> = Arc::new(
        FsBlobStore::open(&config.blob_dir, &config.blob_public_base_url)
            .await
            .context("Failed to prepare blob bucket")?,
    );

    let state = api::ApiState {
        service: RegistrationService::new(records, blobs),
        config: config.clone(),
    };

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal, initiating graceful shutdown...");
                let _ = shutdown_tx.send(());
            }
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        }
    });

    api::serve_with_shutdown(state, shutdown_rx).await?;

    info!("Registration service stopped");
    Ok(())
}
