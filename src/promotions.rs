//! Promotions
//!
//! A checkout recognises exactly one promotion code. Entering it (in any
//! letter case) discounts every unit price by the promotion's percentage and,
//! by default, waives the delivery fee.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;

use crate::prices::UnitPrice;

/// The single promotion a checkout recognises.
#[derive(Debug, Clone)]
pub struct Promotion {
    code: String,
    discount: Percentage,
    waives_delivery: bool,
}

impl Promotion {
    /// Creates a new promotion.
    #[must_use]
    pub fn new(code: impl Into<String>, discount: Percentage, waives_delivery: bool) -> Self {
        Self {
            code: code.into(),
            discount,
            waives_delivery,
        }
    }

    /// Returns the recognised code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the percentage taken off each unit price.
    pub fn discount(&self) -> Percentage {
        self.discount
    }

    /// Whether the delivery fee is dropped while this promotion is applied.
    pub fn waives_delivery(&self) -> bool {
        self.waives_delivery
    }

    /// Whether `input` names this promotion, ignoring letter case and surrounding whitespace.
    pub fn matches(&self, input: &str) -> bool {
        let input = input.trim();

        !input.is_empty() && input.to_lowercase() == self.code.trim().to_lowercase()
    }

    /// Returns `price` with this promotion's discount taken off.
    pub fn discounted(&self, price: UnitPrice) -> Decimal {
        let price = price.amount();

        price.saturating_sub(self.discount * price)
    }
}

/// Result of entering a promotion code.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionOutcome {
    /// The code matched and the promotion is now applied.
    Accepted,

    /// The code didn't match; nothing changed.
    Rejected,
}

/// The promotion as entered in the current checkout session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromotionState {
    code: String,
    applied: bool,
}

impl PromotionState {
    /// Returns the code as the user entered it, trimmed, or an empty string.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Whether a valid promotion is currently active.
    pub fn is_applied(&self) -> bool {
        self.applied
    }

    /// Applies `input` if it names `promotion`.
    ///
    /// Re-applying while already applied is accepted and changes nothing.
    pub fn apply(&mut self, promotion: &Promotion, input: &str) -> PromotionOutcome {
        if !promotion.matches(input) {
            return PromotionOutcome::Rejected;
        }

        if !self.applied {
            input.trim().clone_into(&mut self.code);
            self.applied = true;
        }

        PromotionOutcome::Accepted
    }

    /// Clears the applied flag and the entered code.
    pub fn remove(&mut self) {
        self.code.clear();
        self.applied = false;
    }

    /// Returns `promotion` when this state has it applied.
    pub fn active<'a>(&self, promotion: &'a Promotion) -> Option<&'a Promotion> {
        self.applied.then_some(promotion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half_off() -> Promotion {
        Promotion::new("SAVE50", Percentage::from(0.5), true)
    }

    #[test]
    fn matches_ignores_case_and_whitespace() {
        let promotion = half_off();

        assert!(promotion.matches("save50"));
        assert!(promotion.matches("  Save50 "));
        assert!(!promotion.matches("SAVE5"));
        assert!(!promotion.matches(""));
    }

    #[test]
    fn discounted_halves_price() {
        let promotion = half_off();

        assert_eq!(
            promotion.discounted(UnitPrice::from_minor(12_00)),
            Decimal::new(6, 0)
        );
    }

    #[test]
    fn apply_accepts_matching_code_and_keeps_input() {
        let mut state = PromotionState::default();

        let outcome = state.apply(&half_off(), "save50");

        assert_eq!(outcome, PromotionOutcome::Accepted);
        assert!(state.is_applied());
        assert_eq!(state.code(), "save50");
    }

    #[test]
    fn apply_stores_trimmed_code() {
        let mut state = PromotionState::default();

        let _accepted = state.apply(&half_off(), "  Save50 ");

        assert_eq!(state.code(), "Save50");
    }

    #[test]
    fn apply_rejects_unknown_code_without_changes() {
        let mut state = PromotionState::default();

        let outcome = state.apply(&half_off(), "FREEFOOD");

        assert_eq!(outcome, PromotionOutcome::Rejected);
        assert_eq!(state, PromotionState::default());
    }

    #[test]
    fn apply_is_idempotent() {
        let promotion = half_off();
        let mut once = PromotionState::default();
        let mut twice = PromotionState::default();

        let _accepted = once.apply(&promotion, "SAVE50");
        let _accepted = twice.apply(&promotion, "SAVE50");
        let outcome = twice.apply(&promotion, "SAVE50");

        assert_eq!(outcome, PromotionOutcome::Accepted);
        assert_eq!(once, twice);
    }

    #[test]
    fn rejected_code_keeps_existing_promotion() {
        let promotion = half_off();
        let mut state = PromotionState::default();

        let _accepted = state.apply(&promotion, "SAVE50");
        let outcome = state.apply(&promotion, "nope");

        assert_eq!(outcome, PromotionOutcome::Rejected);
        assert!(state.is_applied());
    }

    #[test]
    fn remove_clears_flag_and_code() {
        let mut state = PromotionState::default();

        let _accepted = state.apply(&half_off(), "SAVE50");
        state.remove();

        assert!(!state.is_applied());
        assert_eq!(state.code(), "");
    }

    #[test]
    fn remove_without_promotion_leaves_default_state() {
        let mut state = PromotionState::default();

        state.remove();

        assert_eq!(state, PromotionState::default());
    }

    #[test]
    fn active_only_when_applied() {
        let promotion = half_off();
        let mut state = PromotionState::default();

        assert!(state.active(&promotion).is_none());

        let _accepted = state.apply(&promotion, "SAVE50");

        assert!(state.active(&promotion).is_some());
    }
}
