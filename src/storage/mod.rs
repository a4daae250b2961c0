//! Cart Storage
//!
//! The durable side of a checkout: a passive mapping from string keys to
//! serialized blobs.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing store failed.
    #[error("storage I/O failed for key {key}")]
    Io {
        /// Key being accessed.
        key: String,

        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The key can't be represented by this backend.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// The backend refused the request.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Key-value blob store consumed by the cart.
#[automock]
#[async_trait]
pub trait CartStorage: Send + Sync {
    /// Fetch the blob stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `blob` under `key`, replacing any previous value.
    async fn set(&self, key: &str, blob: String) -> Result<(), StorageError>;
}
