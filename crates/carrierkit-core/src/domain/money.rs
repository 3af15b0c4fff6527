use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Minor-unit exponent applied to every supported currency.
const MINOR_UNIT_DIGITS: u32 = 2;

/// Monetary amount stored as an integer count of minor units (cents).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    minor_units: i64,
    currency: String,
}

impl Money {
    pub fn from_minor_units(
        minor_units: i64,
        currency: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            minor_units,
            currency: validate_currency_code(currency.as_ref())?,
        })
    }

    /// Converts a carrier decimal string (`"12.345"`) into minor units.
    ///
    /// This is the only place a decimal price becomes money; half-way values
    /// round away from zero (`12.345` becomes `1235`).
    pub fn from_decimal_str(
        amount: &str,
        currency: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        let trimmed = amount.trim();
        let value = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| ValidationError::InvalidAmount {
                value: amount.to_owned(),
            })?;
        let out_of_range = || ValidationError::AmountOutOfRange {
            value: amount.to_owned(),
        };
        let minor_units = value
            .checked_mul(Decimal::from(10_i64.pow(MINOR_UNIT_DIGITS)))
            .ok_or_else(out_of_range)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or_else(out_of_range)?;
        Self::from_minor_units(minor_units, currency)
    }

    pub const fn minor_units(&self) -> i64 {
        self.minor_units
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Exact decimal view, for display only.
    pub fn as_decimal(&self) -> Decimal {
        Decimal::new(self.minor_units, MINOR_UNIT_DIGITS)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} {}", self.as_decimal(), self.currency)
    }
}

/// Validate and normalize currency to uppercase 3-letter code.
pub fn validate_currency_code(input: &str) -> Result<String, ValidationError> {
    let normalized = input.trim().to_ascii_uppercase();
    let is_valid = normalized.len() == 3 && normalized.chars().all(|ch| ch.is_ascii_alphabetic());

    if !is_valid {
        return Err(ValidationError::InvalidCurrency {
            value: input.to_owned(),
        });
    }

    Ok(normalized)
}
