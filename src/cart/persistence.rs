//! Cart persistence
//!
//! Snapshots of the full line-item list are written by a single background
//! task in the order they were issued, so an older snapshot can never land
//! after a newer one.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use thiserror::Error;
use tokio::{
    runtime::Handle,
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, error, instrument, warn};

use crate::{
    items::{ItemId, LineItem},
    storage::{CartStorage, StorageError},
};

/// Reasons a saved cart couldn't be used.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The storage backend failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The stored snapshot isn't a valid line-item list.
    #[error("saved cart is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The stored snapshot lists the same item twice.
    #[error("saved cart repeats item id {0}")]
    DuplicateId(ItemId),
}

/// Serializes `items` into a snapshot blob.
///
/// # Errors
///
/// Returns a [`serde_json::Error`] if encoding fails.
pub fn encode_items(items: &[LineItem]) -> Result<String, serde_json::Error> {
    serde_json::to_string(items)
}

/// Parses a snapshot blob.
///
/// # Errors
///
/// Returns a [`serde_json::Error`] if the blob isn't a valid line-item list.
pub fn decode_items(blob: &str) -> Result<Vec<LineItem>, serde_json::Error> {
    serde_json::from_str(blob)
}

/// Reads the snapshot stored under `key`.
///
/// # Errors
///
/// Returns a [`LoadError`] if storage fails, the snapshot is malformed, or it
/// repeats an item id.
#[instrument(skip(storage))]
pub async fn load_items(
    storage: &dyn CartStorage,
    key: &str,
) -> Result<Option<Vec<LineItem>>, LoadError> {
    let Some(blob) = storage.get(key).await? else {
        return Ok(None);
    };

    let items = decode_items(&blob)?;
    let mut seen = FxHashSet::default();

    if let Some(item) = items.iter().find(|item| !seen.insert(item.id())) {
        return Err(LoadError::DuplicateId(item.id().clone()));
    }

    Ok(Some(items))
}

#[derive(Debug)]
enum SaveCommand {
    Save(String),
    Flush(oneshot::Sender<()>),
}

/// Handle to the background writer.
///
/// Without a tokio runtime there is no writer: snapshots are dropped with a
/// warning and the cart works in memory only.
#[derive(Debug)]
pub(crate) struct SaveQueue {
    sender: mpsc::UnboundedSender<SaveCommand>,
    worker: Option<JoinHandle<()>>,
}

impl SaveQueue {
    /// Spawns the writer task on the current tokio runtime, if there is one.
    pub(crate) fn spawn(storage: Arc<dyn CartStorage>, key: String) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        let worker = match Handle::try_current() {
            Ok(handle) => Some(handle.spawn(run_writer(storage, key, receiver))),
            Err(error) => {
                error!(%error, key = %key, "no tokio runtime; cart changes won't be saved");
                None
            }
        };

        Self { sender, worker }
    }

    /// Queues a snapshot of `items`. Empty lists are never written.
    pub(crate) fn enqueue(&self, items: &[LineItem]) {
        if items.is_empty() {
            debug!("cart is empty; skipping save");
            return;
        }

        let blob = match encode_items(items) {
            Ok(blob) => blob,
            Err(error) => {
                error!(%error, "failed to encode cart snapshot");
                return;
            }
        };

        if self.sender.send(SaveCommand::Save(blob)).is_err() {
            warn!("cart writer has stopped; snapshot dropped");
        }
    }

    /// Waits until every snapshot queued so far has been handled.
    pub(crate) async fn flush(&self) {
        let (ack, done) = oneshot::channel();

        if self.sender.send(SaveCommand::Flush(ack)).is_err() {
            warn!("cart writer has stopped; nothing to flush");
            return;
        }

        if done.await.is_err() {
            warn!("cart writer stopped before acknowledging flush");
        }
    }

    /// Drains outstanding snapshots and stops the writer.
    pub(crate) async fn close(self) {
        let Self { sender, worker } = self;

        drop(sender);

        let Some(worker) = worker else {
            return;
        };

        if let Err(error) = worker.await {
            error!(%error, "cart writer task failed");
        }
    }
}

async fn run_writer(
    storage: Arc<dyn CartStorage>,
    key: String,
    mut receiver: mpsc::UnboundedReceiver<SaveCommand>,
) {
    while let Some(command) = receiver.recv().await {
        match command {
            SaveCommand::Save(blob) => match storage.set(&key, blob).await {
                Ok(()) => debug!(key = %key, "saved cart"),
                Err(error) => error!(%error, key = %key, "failed to save cart"),
            },
            SaveCommand::Flush(ack) => {
                if ack.send(()).is_err() {
                    debug!("flush waiter went away");
                }
            }
        }
    }

    debug!(key = %key, "cart writer stopped");
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{fixtures::seed_items, storage::MemoryStorage};

    use super::*;

    #[test]
    fn snapshot_round_trips() -> TestResult {
        let items = seed_items();

        assert_eq!(decode_items(&encode_items(&items)?)?, items);

        Ok(())
    }

    #[tokio::test]
    async fn load_items_missing_key() -> TestResult {
        let storage = MemoryStorage::new();

        assert!(load_items(&storage, "cart_items").await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn load_items_malformed_blob() {
        let storage = MemoryStorage::with_entry("cart_items", "{not json");

        let result = load_items(&storage, "cart_items").await;

        assert!(matches!(result, Err(LoadError::Malformed(_))));
    }

    #[tokio::test]
    async fn load_items_rejects_repeated_ids() -> TestResult {
        let mut items = seed_items();
        items.extend(seed_items().into_iter().take(1));

        let storage = MemoryStorage::with_entry("cart_items", encode_items(&items)?);

        let result = load_items(&storage, "cart_items").await;

        assert!(matches!(result, Err(LoadError::DuplicateId(id)) if id.as_str() == "1"));

        Ok(())
    }

    #[test]
    fn spawn_without_runtime_drops_snapshots() {
        let storage = MemoryStorage::new();
        let queue = SaveQueue::spawn(Arc::new(storage), "cart_items".into());

        queue.enqueue(&seed_items());

        assert!(queue.worker.is_none(), "no writer without a runtime");
    }

    #[tokio::test]
    async fn queue_writes_latest_snapshot() -> TestResult {
        let storage = MemoryStorage::new();
        let queue = SaveQueue::spawn(Arc::new(storage.clone()), "cart_items".into());
        let mut items = seed_items();

        queue.enqueue(&items);
        items.truncate(1);
        queue.enqueue(&items);
        queue.flush().await;

        let saved = storage.blob("cart_items").await.ok_or("nothing saved")?;

        assert_eq!(decode_items(&saved)?, items);

        queue.close().await;

        Ok(())
    }

    #[tokio::test]
    async fn queue_skips_empty_lists() {
        let storage = MemoryStorage::new();
        let queue = SaveQueue::spawn(Arc::new(storage.clone()), "cart_items".into());

        queue.enqueue(&[]);
        queue.close().await;

        assert!(storage.blob("cart_items").await.is_none());
    }

    #[tokio::test]
    async fn close_drains_pending_snapshots() {
        let storage = MemoryStorage::new();
        let queue = SaveQueue::spawn(Arc::new(storage.clone()), "cart_items".into());

        queue.enqueue(&seed_items());
        queue.close().await;

        assert!(storage.blob("cart_items").await.is_some());
    }
}
