use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

use crate::errors::CoreError;
use crate::models::price::{PriceIndex, PricePoint};

use super::manager::StorageManager;
use super::memory::PriceTable;
use super::traits::PriceStore;

/// Price store persisted to a single PHPC file.
///
/// The file is read lazily on first use and rewritten after every write.
/// Concurrent callers in one process share the loaded table behind a lock.
pub struct FilePriceStore {
    path: PathBuf,
    table: RwLock<Option<PriceTable>>,
}

impl FilePriceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<PriceTable, CoreError> {
        let records = StorageManager::load_from_file(&self.path).await?;
        debug!("Loaded {} cached prices from {:?}", records.len(), self.path);
        Ok(PriceTable::from_records(records))
    }

    async fn with_table<T>(&self, f: impl FnOnce(&PriceTable) -> T) -> Result<T, CoreError> {
        if let Some(table) = self.table.read().await.as_ref() {
            return Ok(f(table));
        }
        let mut guard = self.table.write().await;
        if guard.is_none() {
            *guard = Some(self.load().await?);
        }
        match guard.as_ref() {
            Some(table) => Ok(f(table)),
            None => Ok(f(&PriceTable::default())),
        }
    }
}

#[async_trait]
impl PriceStore for FilePriceStore {
    async fn read_prices(&self, index: &PriceIndex) -> Result<Vec<PricePoint>, CoreError> {
        self.with_table(|table| table.query(index))
            .await
            .map_err(|e| CoreError::CacheRead(e.to_string()))
    }

    async fn write_prices(&self, points: &[PricePoint]) -> Result<usize, CoreError> {
        if points.is_empty() {
            return Ok(0);
        }
        let mut guard = self.table.write().await;
        if guard.is_none() {
            *guard = Some(
                self.load()
                    .await
                    .map_err(|e| CoreError::CacheWrite(e.to_string()))?,
            );
        }
        let table = guard.get_or_insert_with(PriceTable::default);

        let mut updated = table.clone();
        let written = updated.upsert(points, Utc::now().naive_utc());
        StorageManager::save_to_file(&updated.records(), &self.path)
            .await
            .map_err(|e| CoreError::CacheWrite(e.to_string()))?;

        // only publish the new table once it is on disk
        *table = updated;
        Ok(written)
    }

    async fn len(&self) -> Result<usize, CoreError> {
        self.with_table(PriceTable::len)
            .await
            .map_err(|e| CoreError::CacheRead(e.to_string()))
    }
}
