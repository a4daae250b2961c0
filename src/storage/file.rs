//! File storage
//!
//! One file per key under a directory. Writes go to a temporary file first and
//! are renamed into place.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::{CartStorage, StorageError};

/// Directory-backed storage.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Creates storage rooted at `root`. The directory is created on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.root.join(format!("{key}.json")))
    }
}

fn io_error(key: &str) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        key: key.to_string(),
        source,
    }
}

#[async_trait]
impl CartStorage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;

        match fs::read_to_string(&path).await {
            Ok(blob) => Ok(Some(blob)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(io_error(key)(error)),
        }
    }

    async fn set(&self, key: &str, blob: String) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let staging = path.with_extension("json.tmp");

        fs::create_dir_all(&self.root).await.map_err(io_error(key))?;
        fs::write(&staging, blob).await.map_err(io_error(key))?;
        fs::rename(&staging, &path).await.map_err(io_error(key))?;

        debug!(key, path = %path.display(), "wrote blob");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn missing_file_reads_as_none() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage = FileStorage::new(dir.path());

        assert_eq!(storage.get("cart_items").await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn set_creates_directory_and_round_trips() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage = FileStorage::new(dir.path().join("nested"));

        storage.set("cart_items", "[1]".to_string()).await?;
        storage.set("cart_items", "[2]".to_string()).await?;

        assert_eq!(storage.get("cart_items").await?, Some("[2]".to_string()));
        assert!(storage.root().join("cart_items.json").exists());

        Ok(())
    }

    #[tokio::test]
    async fn rejects_path_like_keys() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage = FileStorage::new(dir.path());

        let result = storage.set("../escape", String::new()).await;

        assert!(matches!(result, Err(StorageError::InvalidKey(key)) if key == "../escape"));

        Ok(())
    }
}
