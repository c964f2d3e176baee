//! Boundaries to the external record store and blob store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{StoreError, UploadError};
use crate::model::{Registration, SheetRow};

pub mod bucket;
pub mod memory;
pub mod postgres;

pub use bucket::FsBlobStore;
pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

/// Append-only row store. There is no update or delete path.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn append_row(&self, record: &Registration) -> Result<(), StoreError>;

    /// Every stored row in insertion order, duplicates included.
    async fn list_all_rows(&self) -> Result<Vec<SheetRow>, StoreError>;
}

/// Upload sink for proof-of-payment images.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores the bytes and returns a URL that can be fetched without credentials.
    async fn upload_image(
        &self,
        bytes: &[u8],
        mime_type: &str,
        suggested_name: &str,
    ) -> Result<String, UploadError>;
}

/// `{user name}_{yyyymmdd_hhmmss}.{ext}`, with the extension taken from the
/// uploaded file name.
pub fn blob_name(user_name: &str, file_name: &str, at: DateTime<Utc>) -> String {
    let user: String = user_name
        .trim()
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-'))
        .collect();
    let extension: String = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or(file_name)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    format!("{}_{}.{}", user, at.format("%Y%m%d_%H%M%S"), extension)
}
