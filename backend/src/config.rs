//! Runtime configuration, read from the environment after loading `.env`.
//!
//! | Variable                  | Default                        |
//! |---------------------------|--------------------------------|
//! | `DATABASE_URL`            | unset: in-memory record store  |
//! | `BIND_ADDRESS`            | `0.0.0.0:8080`                 |
//! | `BLOB_DIR`                | `./bucket`                     |
//! | `BLOB_PUBLIC_BASE_URL`    | `http://localhost:8080/bucket` |
//! | `DB_MAX_CONNECTIONS`      | `5`                            |
//! | `DB_ACQUIRE_TIMEOUT_SECS` | `5`                            |
//! | `EXPORT_FILE_PREFIX`      | `luxquant_users`               |

use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// URL path the blob directory is served under.
pub const BUCKET_ROUTE: &str = "/bucket";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub bind_address: SocketAddr,
    pub blob_dir: PathBuf,
    pub blob_public_base_url: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub export_file_prefix: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_address = parse_or(&get, "BIND_ADDRESS", "0.0.0.0:8080")?;
        let db_max_connections = parse_or(&get, "DB_MAX_CONNECTIONS", "5")?;
        let acquire_secs: u64 = parse_or(&get, "DB_ACQUIRE_TIMEOUT_SECS", "5")?;

        Ok(Self {
            database_url: get("DATABASE_URL"),
            bind_address,
            blob_dir: get("BLOB_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./bucket")),
            blob_public_base_url: get("BLOB_PUBLIC_BASE_URL")
                .unwrap_or_else(|| format!("http://localhost:8080{BUCKET_ROUTE}")),
            db_max_connections,
            db_acquire_timeout: Duration::from_secs(acquire_secs),
            export_file_prefix: get("EXPORT_FILE_PREFIX")
                .unwrap_or_else(|| "luxquant_users".to_string()),
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    let raw = get(key).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse()
        .with_context(|| format!("{key} has an invalid value: {raw:?}"))
}
