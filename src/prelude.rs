//! Checkout prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{CartStore, OrderError},
    config::{CheckoutConfig, ConfigError, StorageKeys},
    items::{ItemId, LineItem, PlacedAt, quantity},
    prices::{PriceError, UnitPrice},
    pricing::{Charges, Totals},
    promotions::{Promotion, PromotionOutcome, PromotionState},
    receipt::{Receipt, ReceiptError},
    storage::{CartStorage, FileStorage, MemoryStorage, StorageError},
    undo::UndoState,
};
