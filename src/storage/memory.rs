//! In-memory storage

use std::sync::Arc;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use tokio::sync::Mutex;

use super::{CartStorage, StorageError};

/// Process-local storage. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<FxHashMap<String, String>>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding a single entry.
    #[must_use]
    pub fn with_entry(key: impl Into<String>, blob: impl Into<String>) -> Self {
        let mut entries = FxHashMap::default();
        entries.insert(key.into(), blob.into());

        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    /// Returns a copy of the blob under `key`.
    pub async fn blob(&self, key: &str) -> Option<String> {
        self.entries.lock().await.get(key).cloned()
    }
}

#[async_trait]
impl CartStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.blob(key).await)
    }

    async fn set(&self, key: &str, blob: String) -> Result<(), StorageError> {
        self.entries.lock().await.insert(key.to_string(), blob);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn missing_key_reads_as_none() -> TestResult {
        let storage = MemoryStorage::new();

        assert_eq!(storage.get("cart_items").await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn set_then_get() -> TestResult {
        let storage = MemoryStorage::new();

        storage.set("cart_items", "[]".to_string()).await?;

        assert_eq!(storage.get("cart_items").await?, Some("[]".to_string()));

        Ok(())
    }

    #[tokio::test]
    async fn clones_share_entries() -> TestResult {
        let storage = MemoryStorage::with_entry("a", "1");
        let other = storage.clone();

        other.set("a", "2".to_string()).await?;

        assert_eq!(storage.blob("a").await, Some("2".to_string()));

        Ok(())
    }
}
