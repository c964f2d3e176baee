use async_trait::async_trait;
use tokio::sync::RwLock;

use super::RecordStore;
use crate::error::StoreError;
use crate::model::{Registration, SheetRow};

/// Process-local row store, used when no database is configured.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    rows: RwLock<Vec<SheetRow>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn append_row(&self, record: &Registration) -> Result<(), StoreError> {
        self.rows.write().await.push(record.to_row());
        Ok(())
    }

    async fn list_all_rows(&self) -> Result<Vec<SheetRow>, StoreError> {
        Ok(self.rows.read().await.clone())
    }
}
