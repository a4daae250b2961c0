//! Prices

use std::{fmt, ops::Deref};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing a unit price.
#[derive(Debug, Error, PartialEq)]
pub enum PriceError {
    /// Unit prices can't be negative.
    #[error("unit price {0} is negative")]
    Negative(Decimal),
}

/// A non-negative unit price in major units (e.g. `20.00`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct UnitPrice {
    value: Decimal,
}

impl UnitPrice {
    /// Zero price.
    pub const ZERO: Self = Self {
        value: Decimal::ZERO,
    };

    /// Creates a price from minor units with two decimal places, e.g. `20_00` for `20.00`.
    #[must_use]
    pub const fn from_minor(minor: u32) -> Self {
        Self {
            value: Decimal::from_parts(minor, 0, 0, false, 2),
        }
    }

    /// Creates a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] when `value` is below zero.
    pub fn new(value: Decimal) -> Result<Self, PriceError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(PriceError::Negative(value));
        }

        Ok(Self { value })
    }

    /// Returns the underlying decimal amount.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.value
    }
}

impl Deref for UnitPrice {
    type Target = Decimal;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl TryFrom<Decimal> for UnitPrice {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UnitPrice> for Decimal {
    fn from(price: UnitPrice) -> Self {
        price.value
    }
}

impl fmt::Display for UnitPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn from_minor_keeps_two_decimal_places() {
        let price = UnitPrice::from_minor(20_00);

        assert_eq!(price.to_string(), "20.00");
        assert_eq!(price.amount(), Decimal::new(20, 0));
    }

    #[test]
    fn new_rejects_negative_amounts() {
        let result = UnitPrice::new(Decimal::new(-1, 2));

        assert_eq!(result, Err(PriceError::Negative(Decimal::new(-1, 2))));
    }

    #[test]
    fn new_accepts_zero() -> TestResult {
        let price = UnitPrice::new(Decimal::ZERO)?;

        assert_eq!(price, UnitPrice::ZERO);

        Ok(())
    }

    #[test]
    fn price_derefs_to_decimal() {
        let price = UnitPrice::from_minor(1_50);

        assert!(price.is_sign_positive());
        assert_eq!(*price, Decimal::new(150, 2));
    }

    #[test]
    fn deserializing_negative_price_fails() {
        let result = serde_json::from_str::<UnitPrice>("\"-3.00\"");

        assert!(result.is_err());
    }
}
