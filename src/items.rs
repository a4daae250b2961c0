//! Line Items

use std::{fmt, num::NonZeroU32};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::prices::UnitPrice;

/// Clamps `n` to a valid line item quantity (at least one).
#[must_use]
pub const fn quantity(n: u32) -> NonZeroU32 {
    match NonZeroU32::new(n) {
        Some(quantity) => quantity,
        None => NonZeroU32::MIN,
    }
}

/// Opaque line item identifier, unique within a cart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Creates a new identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Informational placement label, kept exactly as it was saved.
///
/// Usually a string, but any JSON value is accepted and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlacedAt(Value);

impl PlacedAt {
    /// Returns the label when it's a string.
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }

    /// Returns the raw JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<&str> for PlacedAt {
    fn from(label: &str) -> Self {
        Self(Value::from(label))
    }
}

impl From<String> for PlacedAt {
    fn from(label: String) -> Self {
        Self(Value::from(label))
    }
}

impl From<Value> for PlacedAt {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl fmt::Display for PlacedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(label) => f.write_str(label),
            other => other.fmt(f),
        }
    }
}

/// A single product entry in the cart with its own quantity.
///
/// The quantity is never zero: decrementing stops at one, and a persisted
/// quantity of zero fails to deserialize.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    id: ItemId,
    name: String,
    unit_price: UnitPrice,
    quantity: NonZeroU32,
    placed_at: PlacedAt,
}

impl LineItem {
    /// Creates a new line item.
    #[must_use]
    pub fn new(
        id: impl Into<ItemId>,
        name: impl Into<String>,
        unit_price: UnitPrice,
        quantity: NonZeroU32,
        placed_at: impl Into<PlacedAt>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            quantity,
            placed_at: placed_at.into(),
        }
    }

    /// Returns the item identifier.
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the undiscounted unit price.
    pub fn unit_price(&self) -> UnitPrice {
        self.unit_price
    }

    /// Returns the quantity.
    pub fn quantity(&self) -> NonZeroU32 {
        self.quantity
    }

    /// Returns the informational placement label.
    pub fn placed_at(&self) -> &PlacedAt {
        &self.placed_at
    }

    /// Adds one to the quantity, saturating at `u32::MAX`.
    pub fn increment(&mut self) {
        self.quantity = self.quantity.saturating_add(1);
    }

    /// Removes one from the quantity when it's above one.
    ///
    /// Returns `false` (and leaves the item untouched) at quantity one.
    pub fn decrement(&mut self) -> bool {
        match NonZeroU32::new(self.quantity.get() - 1) {
            Some(quantity) => {
                self.quantity = quantity;
                true
            }
            None => false,
        }
    }
}

/// Returns the position of the item with `id`, if present.
pub fn position_of(items: &[LineItem], id: &ItemId) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}
