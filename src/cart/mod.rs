//! Cart Store
//!
//! Owns the line items, promotion state and cancellation buffer for one
//! checkout session. Mutations are synchronous; each one that changes the
//! line-item list queues a snapshot for the background writer.

use std::{fmt, sync::Arc};

use jiff::Timestamp;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::{
    config::CheckoutConfig,
    fixtures::seed_items,
    items::{ItemId, LineItem, position_of},
    pricing::{Totals, calculate_totals},
    promotions::{PromotionOutcome, PromotionState},
    receipt::Receipt,
    storage::{CartStorage, StorageError},
    undo::{CancellationBuffer, UndoState},
};

pub mod persistence;

use persistence::{SaveQueue, load_items};

/// Errors raised when placing an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The promotion flag couldn't be written.
    #[error("failed to record promotion flag")]
    Storage(#[from] StorageError),

    /// The promotion flag couldn't be encoded.
    #[error("failed to encode promotion flag")]
    Serialization(#[from] serde_json::Error),
}

/// The cart for one checkout session.
pub struct CartStore {
    items: Vec<LineItem>,
    promotion: PromotionState,
    cancellation: CancellationBuffer,
    config: CheckoutConfig,
    storage: Arc<dyn CartStorage>,
    saves: SaveQueue,
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &self.items)
            .field("promotion", &self.promotion)
            .field("cancellation", &self.cancellation)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Opens a cart, restoring the saved line items when there are any.
    ///
    /// Falls back to the seed items when nothing is saved, the saved list is
    /// empty, or it can't be read or repeats an item id. Outside a tokio
    /// runtime the cart still loads but changes aren't saved.
    #[instrument(skip_all, fields(key = %config.keys.cart_items))]
    pub async fn load(storage: Arc<dyn CartStorage>, config: CheckoutConfig) -> Self {
        let items = match load_items(storage.as_ref(), &config.keys.cart_items).await {
            Ok(Some(items)) if !items.is_empty() => {
                info!(count = items.len(), "restored saved cart");
                items
            }
            Ok(_) => {
                debug!("no saved cart; using seed items");
                seed_items()
            }
            Err(error) => {
                warn!(%error, "saved cart unusable; using seed items");
                seed_items()
            }
        };

        let saves = SaveQueue::spawn(Arc::clone(&storage), config.keys.cart_items.clone());

        Self {
            items,
            promotion: PromotionState::default(),
            cancellation: CancellationBuffer::default(),
            config,
            storage,
            saves,
        }
    }

    /// Returns the line items in display order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Returns the line item with `id`.
    pub fn item(&self, id: &ItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Returns the promotion state.
    pub fn promotion(&self) -> &PromotionState {
        &self.promotion
    }

    /// Returns the undo affordance state.
    pub fn undo_state(&self) -> UndoState {
        self.cancellation.state()
    }

    /// Returns the item an undo would restore.
    pub fn pending_undo(&self) -> Option<&LineItem> {
        self.cancellation.item()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    /// Computes the current totals.
    pub fn totals(&self) -> Totals {
        calculate_totals(
            &self.items,
            self.promotion.active(&self.config.promotion),
            &self.config.charges,
            self.config.currency,
        )
    }

    /// Adds one to the quantity of `id`. Unknown ids are ignored.
    pub fn increment_quantity(&mut self, id: &ItemId) {
        let Some(item) = self.item_mut(id) else {
            debug!(item_id = %id, "increment ignored: unknown item");
            return;
        };

        item.increment();
        debug!(item_id = %id, quantity = item.quantity().get(), "incremented quantity");

        self.persist();
    }

    /// Removes one from the quantity of `id`, stopping at one. Unknown ids are ignored.
    pub fn decrement_quantity(&mut self, id: &ItemId) {
        let Some(item) = self.item_mut(id) else {
            debug!(item_id = %id, "decrement ignored: unknown item");
            return;
        };

        if !item.decrement() {
            debug!(item_id = %id, "decrement ignored: quantity already one");
            return;
        }

        debug!(item_id = %id, quantity = item.quantity().get(), "decremented quantity");

        self.persist();
    }

    /// Removes `id` from the cart and holds it for undo. Unknown ids are ignored.
    ///
    /// Any item already held for undo is discarded.
    pub fn cancel_item(&mut self, id: &ItemId) {
        let Some(position) = position_of(&self.items, id) else {
            debug!(item_id = %id, "cancel ignored: unknown item");
            return;
        };

        let item = self.items.remove(position);

        if let Some(discarded) = self.cancellation.stash(item) {
            debug!(item_id = %discarded.id(), "discarded previous cancellation");
        }

        info!(item_id = %id, "cancelled item");

        self.persist();
    }

    /// Restores the cancelled item to the end of the cart.
    ///
    /// Returns `false` when there's nothing to undo.
    pub fn undo_cancel(&mut self) -> bool {
        let Some(item) = self.cancellation.restore() else {
            debug!("undo ignored: nothing cancelled");
            return false;
        };

        info!(item_id = %item.id(), "restored cancelled item");

        self.items.push(item);
        self.persist();

        true
    }

    /// Forgets the cancelled item and hides the undo affordance.
    pub fn dismiss_undo(&mut self) {
        if let Some(item) = self.cancellation.dismiss() {
            debug!(item_id = %item.id(), "cancellation confirmed");
        }
    }

    /// Applies a user-entered promotion code.
    pub fn apply_promotion(&mut self, code: &str) -> PromotionOutcome {
        let outcome = self.promotion.apply(&self.config.promotion, code);

        match outcome {
            PromotionOutcome::Accepted => info!("promotion applied"),
            PromotionOutcome::Rejected => debug!(code, "promotion code rejected"),
        }

        outcome
    }

    /// Removes the promotion and clears the entered code.
    pub fn remove_promotion(&mut self) {
        self.promotion.remove();

        debug!("promotion removed");
    }

    /// Builds a receipt for the cart as it stands.
    pub fn receipt(&self) -> Receipt {
        Receipt::build(&self.items, &self.promotion, &self.config, None)
    }

    /// Places the order: waits for pending saves, records whether a promotion
    /// was applied for the payment step, and returns the receipt.
    ///
    /// The cart itself is left as is.
    ///
    /// # Errors
    ///
    /// Returns an [`OrderError`] if the promotion flag can't be stored.
    #[instrument(skip(self), fields(key = %self.config.keys.promotion_applied))]
    pub async fn place_order(&self) -> Result<Receipt, OrderError> {
        self.saves.flush().await;

        let applied = self.promotion.is_applied();
        let flag = serde_json::to_string(&applied)?;

        self.storage
            .set(&self.config.keys.promotion_applied, flag)
            .await?;

        info!(promotion_applied = applied, "order placed");

        Ok(Receipt::build(
            &self.items,
            &self.promotion,
            &self.config,
            Some(Timestamp::now()),
        ))
    }

    /// Waits until every save queued so far has been attempted.
    pub async fn flush(&self) {
        self.saves.flush().await;
    }

    /// Ends the session, draining outstanding saves.
    pub async fn close(self) {
        self.saves.close().await;
    }

    fn item_mut(&mut self, id: &ItemId) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    fn persist(&self) {
        self.saves.enqueue(&self.items);
    }
}
