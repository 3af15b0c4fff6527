use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Postal address. Tracking addresses are best-effort and often partial, so
/// only [`Address::new`] validates the country code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub lines: Vec<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl Address {
    /// Builds a shipping address for a request; the country must be an ISO alpha-2 code.
    pub fn new(
        lines: Vec<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            lines,
            city: city.into(),
            state: state.into(),
            postal_code: postal_code.into(),
            country: validate_country_code(country.as_ref())?,
        })
    }

    /// Address as reported by a carrier event, taken verbatim.
    pub fn reported(
        city: impl Into<String>,
        state: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            lines: Vec::new(),
            city: city.into(),
            state: state.into(),
            postal_code: postal_code.into(),
            country: country.into(),
        }
    }
}

/// Validate and normalize a country to an uppercase 2-letter code.
pub fn validate_country_code(input: &str) -> Result<String, ValidationError> {
    let normalized = input.trim().to_ascii_uppercase();
    let is_valid = normalized.len() == 2 && normalized.chars().all(|ch| ch.is_ascii_alphabetic());

    if !is_valid {
        return Err(ValidationError::InvalidCountryCode {
            value: input.to_owned(),
        });
    }

    Ok(normalized)
}
