//! Unit-tagged measurements and exact conversion between units of one dimension.
//!
//! Lengths and weights are separate types, so a length-to-weight conversion
//! cannot be expressed. Conversions are carried out in [`Decimal`] through a
//! per-unit factor to a base unit (centimetres, kilograms); rounding only
//! happens when a value is formatted for a carrier payload.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Decimal places used when a measurement is written into a carrier payload.
pub const WIRE_PRECISION: u32 = 2;

/// A unit belonging to one measurement dimension.
pub trait Unit: Copy + Eq {
    /// Dimension label used in error messages.
    const DIMENSION: &'static str;

    /// Exact factor converting one of this unit into the dimension's base unit.
    fn base_factor(self) -> Decimal;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    Millimeter,
    Centimeter,
    Meter,
    Inch,
    Foot,
}

impl Unit for LengthUnit {
    const DIMENSION: &'static str = "length";

    fn base_factor(self) -> Decimal {
        match self {
            Self::Millimeter => Decimal::new(1, 1),
            Self::Centimeter => Decimal::ONE,
            Self::Meter => Decimal::ONE_HUNDRED,
            Self::Inch => Decimal::new(254, 2),
            Self::Foot => Decimal::new(3048, 2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    Gram,
    Kilogram,
    Ounce,
    Pound,
}

impl Unit for WeightUnit {
    const DIMENSION: &'static str = "weight";

    fn base_factor(self) -> Decimal {
        match self {
            Self::Gram => Decimal::new(1, 3),
            Self::Kilogram => Decimal::ONE,
            Self::Ounce => Decimal::new(28_349_523_125, 12),
            Self::Pound => Decimal::new(45_359_237, 8),
        }
    }
}

/// A non-negative decimal value tagged with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measure<U> {
    value: Decimal,
    unit: U,
}

pub type Length = Measure<LengthUnit>;
pub type Weight = Measure<WeightUnit>;

impl<U: Unit> Measure<U> {
    pub fn new(value: Decimal, unit: U) -> Result<Self, ValidationError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ValidationError::NegativeValue {
                field: U::DIMENSION,
            });
        }
        Ok(Self { value, unit })
    }

    /// Parses a carrier decimal string such as `"12.50"`.
    pub fn parse(value: &str, unit: U) -> Result<Self, ValidationError> {
        let parsed =
            Decimal::from_str(value.trim()).map_err(|_| ValidationError::InvalidMeasurement {
                value: value.to_owned(),
            })?;
        Self::new(parsed, unit)
    }

    pub fn zero(unit: U) -> Self {
        Self {
            value: Decimal::ZERO,
            unit,
        }
    }

    pub const fn value(&self) -> Decimal {
        self.value
    }

    pub const fn unit(&self) -> U {
        self.unit
    }

    /// Converts into `unit`. Converting to the same unit returns the value unchanged.
    pub fn convert(self, unit: U) -> Result<Self, ValidationError> {
        Ok(Self {
            value: convert(self.value, self.unit, unit)?,
            unit,
        })
    }

    /// Two-decimal representation written into carrier payloads.
    pub fn to_wire(&self) -> String {
        format_wire(self.value)
    }
}

/// Exact linear conversion of `value` between two units of one dimension.
///
/// Fails when the result does not fit a [`Decimal`].
pub fn convert<U: Unit>(value: Decimal, from: U, to: U) -> Result<Decimal, ValidationError> {
    if from == to {
        return Ok(value);
    }
    value
        .checked_mul(from.base_factor())
        .and_then(|base| base.checked_div(to.base_factor()))
        .ok_or_else(|| ValidationError::MeasurementOutOfRange {
            dimension: U::DIMENSION,
            value: value.to_string(),
        })
}

/// Formats a decimal with two places, rounding half away from zero.
pub fn format_wire(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(WIRE_PRECISION, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

impl LengthUnit {
    /// Parses a carrier unit-of-measurement code (`IN`, `CM`, ...).
    pub fn from_code(code: &str) -> Result<Self, ValidationError> {
        match code.trim().to_ascii_uppercase().as_str() {
            "MM" => Ok(Self::Millimeter),
            "CM" | "C" => Ok(Self::Centimeter),
            "M" => Ok(Self::Meter),
            "IN" | "I" => Ok(Self::Inch),
            "FT" => Ok(Self::Foot),
            _ => Err(ValidationError::UnknownUnit {
                dimension: Self::DIMENSION,
                value: code.to_owned(),
            }),
        }
    }
}

impl WeightUnit {
    /// Parses a carrier unit-of-measurement code (`LBS`, `KG`, `K`, ...).
    pub fn from_code(code: &str) -> Result<Self, ValidationError> {
        match code.trim().to_ascii_uppercase().as_str() {
            "G" | "GR" => Ok(Self::Gram),
            "KG" | "KGS" | "K" => Ok(Self::Kilogram),
            "OZ" | "OZS" => Ok(Self::Ounce),
            "LB" | "LBS" | "L" => Ok(Self::Pound),
            _ => Err(ValidationError::UnknownUnit {
                dimension: Self::DIMENSION,
                value: code.to_owned(),
            }),
        }
    }
}

/// Pair of length and weight units a carrier expects in one payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    Metric,
    Imperial,
}

impl UnitSystem {
    pub const fn length_unit(self) -> LengthUnit {
        match self {
            Self::Metric => LengthUnit::Centimeter,
            Self::Imperial => LengthUnit::Inch,
        }
    }

    pub const fn weight_unit(self) -> WeightUnit {
        match self {
            Self::Metric => WeightUnit::Kilogram,
            Self::Imperial => WeightUnit::Pound,
        }
    }

    /// Picks `exception` when `country_code` is in `exception_countries`
    /// (compared case-insensitively), `default` otherwise.
    pub fn for_origin(
        country_code: &str,
        default: Self,
        exception: Self,
        exception_countries: &[&str],
    ) -> Self {
        let country = country_code.trim();
        if exception_countries
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(country))
        {
            exception
        } else {
            default
        }
    }
}

impl Display for LengthUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Millimeter => "mm",
            Self::Centimeter => "cm",
            Self::Meter => "m",
            Self::Inch => "in",
            Self::Foot => "ft",
        })
    }
}

impl Display for WeightUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Gram => "g",
            Self::Kilogram => "kg",
            Self::Ounce => "oz",
            Self::Pound => "lb",
        })
    }
}

impl<U: Unit + Display> Display for Measure<U> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}
