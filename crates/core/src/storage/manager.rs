use std::path::Path;

use crate::errors::CoreError;

use super::format;
use super::traits::StoredPrice;

/// Save/load price records to/from bytes or files.
pub struct StorageManager;

impl StorageManager {
    /// Flow: records → bincode → PHPC format bytes
    pub fn save_to_bytes(records: &[StoredPrice]) -> Result<Vec<u8>, CoreError> {
        let payload = bincode::serialize(records)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize prices: {e}")))?;
        Ok(format::write_file(format::CURRENT_VERSION, &payload))
    }

    /// Flow: PHPC bytes → parse header → bincode → records
    pub fn load_from_bytes(data: &[u8]) -> Result<Vec<StoredPrice>, CoreError> {
        let (_header, payload) = format::read_file(data)?;
        bincode::deserialize(payload)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize prices: {e}")))
    }

    /// Write atomically: a temporary sibling file is renamed over `path`.
    pub async fn save_to_file(records: &[StoredPrice], path: &Path) -> Result<(), CoreError> {
        let bytes = Self::save_to_bytes(records)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Missing file means an empty cache.
    pub async fn load_from_file(path: &Path) -> Result<Vec<StoredPrice>, CoreError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Self::load_from_bytes(&bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}
