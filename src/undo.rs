//! Cancellation buffer
//!
//! Single-slot holding area for the most recently cancelled line item. The
//! undo affordance is visible exactly while the slot is occupied.

use crate::items::LineItem;

/// Visibility of the undo affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoState {
    /// Nothing to undo.
    Hidden,

    /// A cancelled item can be restored.
    Visible,
}

/// Holds at most one cancelled line item.
#[derive(Debug, Clone, Default)]
pub struct CancellationBuffer {
    slot: Option<LineItem>,
}

impl CancellationBuffer {
    /// Stores `item`, returning whatever it displaced.
    pub fn stash(&mut self, item: LineItem) -> Option<LineItem> {
        self.slot.replace(item)
    }

    /// Takes the buffered item for restoring.
    pub fn restore(&mut self) -> Option<LineItem> {
        self.slot.take()
    }

    /// Drops the buffered item for good, returning it.
    pub fn dismiss(&mut self) -> Option<LineItem> {
        self.slot.take()
    }

    /// Returns the buffered item.
    pub fn item(&self) -> Option<&LineItem> {
        self.slot.as_ref()
    }

    /// Returns the undo affordance state.
    pub fn state(&self) -> UndoState {
        if self.slot.is_some() {
            UndoState::Visible
        } else {
            UndoState::Hidden
        }
    }
}
