//! Pricing
//!
//! Derived totals are pure functions of the line items, the active promotion
//! and the configured charges. Nothing here is cached.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

use crate::{items::LineItem, prices::UnitPrice, promotions::Promotion};

/// Flat charges added on top of the item subtotal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Charges {
    /// Flat tax and service fees.
    pub tax_and_fees: UnitPrice,

    /// Delivery fee, waived by a promotion that says so.
    pub delivery: UnitPrice,
}

impl Default for Charges {
    fn default() -> Self {
        Self {
            tax_and_fees: UnitPrice::from_minor(5_00),
            delivery: UnitPrice::from_minor(3_00),
        }
    }
}

/// Cart totals, recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    /// Sum of effective unit prices times quantities.
    pub subtotal: Money<'static, Currency>,

    /// Flat tax and fees.
    pub tax_and_fees: Money<'static, Currency>,

    /// Delivery fee after any promotion.
    pub delivery: Money<'static, Currency>,

    /// `subtotal + tax_and_fees + delivery`.
    pub total: Money<'static, Currency>,
}

/// Returns the unit price of `item` after `promotion`.
pub fn effective_unit_price(item: &LineItem, promotion: Option<&Promotion>) -> Decimal {
    match promotion {
        Some(promotion) => promotion.discounted(item.unit_price()),
        None => item.unit_price().amount(),
    }
}

/// Returns the line total of `item` after `promotion`.
pub fn line_total(item: &LineItem, promotion: Option<&Promotion>) -> Decimal {
    effective_unit_price(item, promotion).saturating_mul(Decimal::from(item.quantity().get()))
}

/// Sums the line totals of `items` after `promotion`.
pub fn subtotal(items: &[LineItem], promotion: Option<&Promotion>) -> Decimal {
    items
        .iter()
        .map(|item| line_total(item, promotion))
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Calculates the cart totals.
pub fn calculate_totals(
    items: &[LineItem],
    promotion: Option<&Promotion>,
    charges: &Charges,
    currency: &'static Currency,
) -> Totals {
    let subtotal = subtotal(items, promotion);
    let tax_and_fees = charges.tax_and_fees.amount();

    let delivery = if promotion.is_some_and(Promotion::waives_delivery) {
        Decimal::ZERO
    } else {
        charges.delivery.amount()
    };

    let total = subtotal
        .saturating_add(tax_and_fees)
        .saturating_add(delivery);

    Totals {
        subtotal: Money::from_decimal(subtotal, currency),
        tax_and_fees: Money::from_decimal(tax_and_fees, currency),
        delivery: Money::from_decimal(delivery, currency),
        total: Money::from_decimal(total, currency),
    }
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use rusty_money::iso::USD;

    use crate::items::quantity;

    use super::*;

    fn test_items() -> [LineItem; 2] {
        [
            LineItem::new("1", "Pizza", UnitPrice::from_minor(20_00), quantity(2), ""),
            LineItem::new("2", "Salad", UnitPrice::from_minor(12_00), quantity(1), ""),
        ]
    }

    fn half_off() -> Promotion {
        Promotion::new("SAVE50", Percentage::from(0.5), true)
    }

    fn usd(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, USD)
    }

    #[test]
    fn totals_without_promotion() {
        let totals = calculate_totals(&test_items(), None, &Charges::default(), USD);

        assert_eq!(totals.subtotal, usd(52_00));
        assert_eq!(totals.tax_and_fees, usd(5_00));
        assert_eq!(totals.delivery, usd(3_00));
        assert_eq!(totals.total, usd(60_00));
    }

    #[test]
    fn totals_with_promotion() {
        let promotion = half_off();
        let totals = calculate_totals(&test_items(), Some(&promotion), &Charges::default(), USD);

        assert_eq!(totals.subtotal, usd(26_00));
        assert_eq!(totals.delivery, usd(0));
        assert_eq!(totals.total, usd(31_00));
    }

    #[test]
    fn promotion_without_delivery_waiver_keeps_fee() {
        let promotion = Promotion::new("SAVE50", Percentage::from(0.5), false);
        let totals = calculate_totals(&test_items(), Some(&promotion), &Charges::default(), USD);

        assert_eq!(totals.delivery, usd(3_00));
        assert_eq!(totals.total, usd(34_00));
    }

    #[test]
    fn empty_cart_is_charges_only() {
        let totals = calculate_totals(&[], None, &Charges::default(), USD);

        assert_eq!(totals.subtotal, usd(0));
        assert_eq!(totals.total, usd(8_00));
    }

    #[test]
    fn total_is_sum_of_parts() {
        let promotion = half_off();

        for promotion in [None, Some(&promotion)] {
            let totals = calculate_totals(&test_items(), promotion, &Charges::default(), USD);
            let sum = *totals.subtotal.amount()
                + *totals.tax_and_fees.amount()
                + *totals.delivery.amount();

            assert_eq!(*totals.total.amount(), sum, "total must equal its parts");
        }
    }

    #[test]
    fn line_total_multiplies_by_quantity() {
        let [pizza, _] = test_items();

        assert_eq!(line_total(&pizza, None), Decimal::new(40, 0));
    }
}
