//! Fixtures
//!
//! The seed cart shown when nothing usable has been saved yet.

use crate::{
    items::{LineItem, quantity},
    prices::UnitPrice,
};

/// Returns the default line items, in display order.
pub fn seed_items() -> Vec<LineItem> {
    vec![
        LineItem::new(
            "1",
            "Margherita Pizza",
            UnitPrice::from_minor(20_00),
            quantity(2),
            "Today, 12:30 PM",
        ),
        LineItem::new(
            "2",
            "Caesar Salad",
            UnitPrice::from_minor(12_00),
            quantity(1),
            "Today, 12:30 PM",
        ),
    ]
}
