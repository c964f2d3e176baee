use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info};

use super::RecordStore;
use crate::error::StoreError;
use crate::model::{Registration, SheetRow};

/// One TEXT column per persisted header, `id` only records insertion order.
const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS registrations (
    id BIGSERIAL PRIMARY KEY,
    timestamp TEXT NOT NULL,
    user_name TEXT NOT NULL,
    chat_user_id TEXT NOT NULL,
    chat_link TEXT NOT NULL,
    package TEXT NOT NULL,
    price_usdt TEXT NOT NULL,
    start_date TEXT NOT NULL,
    network TEXT NOT NULL,
    tx_hash TEXT NOT NULL,
    explorer_link TEXT NOT NULL,
    proof_url TEXT NOT NULL
)";

pub async fn get_db_pool(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await
        .context("Failed to connect to Postgres. Ensure the service is running.")?;

    Ok(pool)
}

/// Registrations kept in a single append-only Postgres table.
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    /// Wraps the pool and creates the table on first use, the row-store
    /// counterpart of writing the header row into an empty sheet.
    pub async fn new(pool: PgPool) -> Result<Self, StoreError> {
        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        info!("Registrations table ready");
        Ok(Self { pool })
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn append_row(&self, record: &Registration) -> Result<(), StoreError> {
        let row = record.to_row();

        sqlx::query(
            "INSERT INTO registrations (timestamp, user_name, chat_user_id, chat_link, package,
                price_usdt, start_date, network, tx_hash, explorer_link, proof_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(&row.timestamp)
        .bind(&row.user_name)
        .bind(&row.chat_user_id)
        .bind(&row.chat_link)
        .bind(&row.package)
        .bind(&row.price_usdt)
        .bind(&row.start_date)
        .bind(&row.network)
        .bind(&row.tx_hash)
        .bind(&row.explorer_link)
        .bind(&row.proof_url)
        .execute(&self.pool)
        .await?;

        debug!(tx_hash = %row.tx_hash, "Appended registration row");
        Ok(())
    }

    async fn list_all_rows(&self) -> Result<Vec<SheetRow>, StoreError> {
        let rows = sqlx::query_as::<_, SheetRow>(
            "SELECT timestamp, user_name, chat_user_id, chat_link, package, price_usdt,
                start_date, network, tx_hash, explorer_link, proof_url
             FROM registrations ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
