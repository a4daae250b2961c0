//! Checkout configuration
//!
//! Loaded from YAML. Every field is optional; omitted fields fall back to the
//! production defaults in [`CheckoutConfig::default`].
//!
//! ```yaml
//! currency: USD
//! promotion:
//!   code: SAVE50
//!   discount: 50%
//!   waives_delivery: true
//! tax_and_fees: 5.00
//! delivery_fee: 3.00
//! keys:
//!   cart_items: cart_items
//!   promotion_applied: promotion_applied
//! ```

use std::{fs, path::Path};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::iso::{self, Currency};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    prices::{PriceError, UnitPrice},
    pricing::Charges,
    promotions::Promotion,
};

/// Code recognised when no configuration overrides it.
pub const DEFAULT_PROMOTION_CODE: &str = "SAVE50";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the configuration file
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Invalid percentage format or out of range
    #[error("invalid percentage: {0}")]
    InvalidPercentage(String),

    /// Negative fee
    #[error(transparent)]
    InvalidAmount(#[from] PriceError),

    /// The promotion code is blank
    #[error("promotion code must not be empty")]
    EmptyPromotionCode,
}

/// Storage keys used by the cart.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageKeys {
    /// Key holding the serialized line items.
    pub cart_items: String,

    /// Key receiving the promotion-applied flag when an order is placed.
    pub promotion_applied: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            cart_items: "cart_items".to_string(),
            promotion_applied: "promotion_applied".to_string(),
        }
    }
}

/// Resolved checkout configuration.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Currency all amounts are expressed in.
    pub currency: &'static Currency,

    /// The single recognised promotion.
    pub promotion: Promotion,

    /// Flat charges.
    pub charges: Charges,

    /// Storage keys.
    pub keys: StorageKeys,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            currency: iso::USD,
            promotion: Promotion::new(DEFAULT_PROMOTION_CODE, Percentage::from(0.5), true),
            charges: Charges::default(),
            keys: StorageKeys::default(),
        }
    }
}

impl CheckoutConfig {
    /// Parse configuration from a YAML document.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the document is malformed or holds invalid values.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_norway::from_str(yaml)?;

        Self::try_from(file)
    }

    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file can't be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    currency: String,
    promotion: PromotionFile,
    tax_and_fees: Decimal,
    delivery_fee: Decimal,
    keys: StorageKeys,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let charges = Charges::default();

        Self {
            currency: iso::USD.iso_alpha_code.to_string(),
            promotion: PromotionFile::default(),
            tax_and_fees: charges.tax_and_fees.amount(),
            delivery_fee: charges.delivery.amount(),
            keys: StorageKeys::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PromotionFile {
    code: String,
    discount: String,
    waives_delivery: bool,
}

impl Default for PromotionFile {
    fn default() -> Self {
        Self {
            code: DEFAULT_PROMOTION_CODE.to_string(),
            discount: "50%".to_string(),
            waives_delivery: true,
        }
    }
}

impl TryFrom<ConfigFile> for CheckoutConfig {
    type Error = ConfigError;

    fn try_from(file: ConfigFile) -> Result<Self, Self::Error> {
        let currency = iso::find(file.currency.trim())
            .ok_or_else(|| ConfigError::UnknownCurrency(file.currency.clone()))?;

        if file.promotion.code.trim().is_empty() {
            return Err(ConfigError::EmptyPromotionCode);
        }

        let discount = parse_percentage(&file.promotion.discount)?;

        Ok(Self {
            currency,
            promotion: Promotion::new(
                file.promotion.code,
                discount,
                file.promotion.waives_delivery,
            ),
            charges: Charges {
                tax_and_fees: UnitPrice::new(file.tax_and_fees)?,
                delivery: UnitPrice::new(file.delivery_fee)?,
            },
            keys: file.keys,
        })
    }
}

/// Parse a percentage string (e.g., "50%" or "0.5") into a `Percentage` between 0% and 100%.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidPercentage`] if the string can't be parsed or is out of range.
pub fn parse_percentage(s: &str) -> Result<Percentage, ConfigError> {
    let trimmed = s.trim();
    let invalid = || ConfigError::InvalidPercentage(s.to_string());

    let fraction = if let Some(percent_str) = trimmed.strip_suffix('%') {
        percent_str
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| invalid())?
            .checked_div(Decimal::ONE_HUNDRED)
            .ok_or_else(invalid)?
    } else {
        trimmed.parse::<Decimal>().map_err(|_err| invalid())?
    };

    if fraction.is_sign_negative() || fraction > Decimal::ONE {
        return Err(invalid());
    }

    Ok(Percentage::from(fraction))
}
