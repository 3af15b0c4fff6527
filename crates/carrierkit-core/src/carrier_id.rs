use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical carrier identifiers used in quotes, tracking results and the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarrierId {
    Ups,
    Dhl,
}

impl CarrierId {
    pub const ALL: [Self; 2] = [Self::Ups, Self::Dhl];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ups => "ups",
            Self::Dhl => "dhl",
        }
    }

    /// Display name used in normalized quotes and tracking payloads.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Ups => "UPS",
            Self::Dhl => "DHL Express",
        }
    }
}

impl Display for CarrierId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CarrierId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ups" => Ok(Self::Ups),
            "dhl" | "dhl_express" => Ok(Self::Dhl),
            other => Err(ValidationError::InvalidCarrier {
                value: other.to_owned(),
            }),
        }
    }
}
