//! Receipt
//!
//! A point-in-time view of the cart with per-line prices and totals, renderable
//! as a console table.

use std::io;

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    config::CheckoutConfig,
    items::LineItem,
    pricing::{Totals, calculate_totals, effective_unit_price, line_total},
    promotions::PromotionState,
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Writing to the output failed.
    #[error("failed to write receipt")]
    IO(#[source] io::Error),
}

/// A priced line on a receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine {
    /// The line item as it was in the cart.
    pub item: LineItem,

    /// Unit price after any promotion.
    pub unit_price: Money<'static, Currency>,

    /// Unit price times quantity.
    pub line_total: Money<'static, Currency>,
}

/// Receipt
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    lines: Vec<ReceiptLine>,
    promotion: PromotionState,
    totals: Totals,
    placed_at: Option<Timestamp>,
}

impl Receipt {
    /// Prices `items` under `promotion` using the checkout configuration.
    pub fn build(
        items: &[LineItem],
        promotion: &PromotionState,
        config: &CheckoutConfig,
        placed_at: Option<Timestamp>,
    ) -> Self {
        let active = promotion.active(&config.promotion);
        let currency = config.currency;

        let lines = items
            .iter()
            .map(|item| ReceiptLine {
                item: item.clone(),
                unit_price: Money::from_decimal(effective_unit_price(item, active), currency),
                line_total: Money::from_decimal(line_total(item, active), currency),
            })
            .collect();

        Self {
            lines,
            promotion: promotion.clone(),
            totals: calculate_totals(items, active, &config.charges, currency),
            placed_at,
        }
    }

    /// Returns the priced lines.
    pub fn lines(&self) -> &[ReceiptLine] {
        &self.lines
    }

    /// Returns the promotion state at the time of the receipt.
    pub fn promotion(&self) -> &PromotionState {
        &self.promotion
    }

    /// Returns the totals.
    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Returns when the order was placed, if it has been.
    pub fn placed_at(&self) -> Option<Timestamp> {
        self.placed_at
    }

    /// Writes the receipt as a table followed by the totals.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["#", "Item", "Qty", "Unit Price", "Line Total"]);

        for line in &self.lines {
            builder.push_record([
                line.item.id().to_string(),
                line.item.name().to_string(),
                line.item.quantity().to_string(),
                line.unit_price.to_string(),
                line.line_total.to_string(),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::new(2..5), Alignment::right());
        table.modify(Rows::first(), Alignment::center());

        writeln!(out, "\n{table}").map_err(ReceiptError::IO)?;

        let promotion = if self.promotion.is_applied() {
            self.promotion.code()
        } else {
            "none"
        };

        let summary = [
            ("Subtotal:", self.totals.subtotal.to_string()),
            ("Tax & fees:", self.totals.tax_and_fees.to_string()),
            ("Delivery:", self.totals.delivery.to_string()),
            ("Total:", self.totals.total.to_string()),
            ("Promotion:", promotion.to_string()),
        ];

        for (label, value) in summary {
            writeln!(out, " {label:<12}{value:>12}").map_err(ReceiptError::IO)?;
        }

        if let Some(placed_at) = self.placed_at {
            writeln!(out, " Placed at {placed_at}").map_err(ReceiptError::IO)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use crate::fixtures::seed_items;

    use super::*;

    #[test]
    fn build_prices_lines_with_promotion() {
        let config = CheckoutConfig::default();
        let mut promotion = PromotionState::default();
        let _accepted = promotion.apply(&config.promotion, "SAVE50");

        let receipt = Receipt::build(&seed_items(), &promotion, &config, None);
        let totals: Vec<_> = receipt.lines().iter().map(|line| line.line_total).collect();

        assert_eq!(
            totals,
            [Money::from_minor(20_00, USD), Money::from_minor(6_00, USD)]
        );
        assert_eq!(receipt.totals().total, Money::from_minor(31_00, USD));
    }

    #[test]
    fn write_to_renders_items_and_totals() -> TestResult {
        let config = CheckoutConfig::default();
        let receipt = Receipt::build(&seed_items(), &PromotionState::default(), &config, None);
        let mut out = Vec::new();

        receipt.write_to(&mut out)?;

        let rendered = String::from_utf8(out)?;

        assert!(rendered.contains("Margherita Pizza"), "missing item name");
        assert!(rendered.contains("$60.00"), "missing total");
        assert!(rendered.contains("none"), "missing promotion placeholder");
        assert!(!rendered.contains("Placed at"), "unplaced receipt has no timestamp");

        Ok(())
    }

    #[test]
    fn write_to_includes_placement_time() -> TestResult {
        let config = CheckoutConfig::default();
        let placed_at = Timestamp::UNIX_EPOCH;
        let receipt = Receipt::build(&[], &PromotionState::default(), &config, Some(placed_at));
        let mut out = Vec::new();

        receipt.write_to(&mut out)?;

        assert!(String::from_utf8(out)?.contains("Placed at 1970-01-01T00:00:00Z"));

        Ok(())
    }
}
