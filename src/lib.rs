//! Checkout
//!
//! The cart and pricing engine behind a food-delivery checkout: line items with
//! quantities, a single recognised promotion code, single-slot undo for
//! cancelled items, and best-effort persistence to a key-value blob store.

pub mod cart;
pub mod config;
pub mod fixtures;
pub mod items;
pub mod observability;
pub mod prelude;
pub mod prices;
pub mod pricing;
pub mod promotions;
pub mod receipt;
pub mod storage;
pub mod undo;
