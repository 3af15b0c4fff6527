use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::macros::{format_description, time};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::ValidationError;

/// Instant on the UTC timeline, used for tracking events and delivery estimates.
///
/// Always rendered as RFC 3339 with a `Z` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(OffsetDateTime);

impl UtcDateTime {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    /// Parses RFC 3339 with any offset, shifting the instant onto UTC.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        OffsetDateTime::parse(input.trim(), &Rfc3339)
            .map(|value| Self(value.to_offset(UtcOffset::UTC)))
            .map_err(|_| ValidationError::InvalidTimestamp {
                value: input.to_owned(),
            })
    }

    /// Compact carrier form: `YYYYMMDD` date and `HHMMSS` (or `HHMM`) time.
    ///
    /// Carriers report local wall-clock time without an offset; it is taken as UTC.
    pub fn from_compact(date: &str, time: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidCarrierTimestamp {
            value: format!("{date} {time}"),
        };
        let date = Date::parse(date.trim(), format_description!("[year][month][day]"))
            .map_err(|_| invalid())?;
        let time = match time.trim().len() {
            0 => Time::MIDNIGHT,
            4 => Time::parse(time.trim(), format_description!("[hour][minute]"))
                .map_err(|_| invalid())?,
            _ => Time::parse(time.trim(), format_description!("[hour][minute][second]"))
                .map_err(|_| invalid())?,
        };
        Ok(Self(PrimitiveDateTime::new(date, time).assume_utc()))
    }

    /// Dashed carrier form: `YYYY-MM-DD` date and `HH:MM:SS` time.
    pub fn from_dashed(date: &str, time: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidCarrierTimestamp {
            value: format!("{date} {time}"),
        };
        let date = Date::parse(date.trim(), format_description!("[year]-[month]-[day]"))
            .map_err(|_| invalid())?;
        let time = Time::parse(time.trim(), format_description!("[hour]:[minute]:[second]"))
            .map_err(|_| invalid())?;
        Ok(Self(PrimitiveDateTime::new(date, time).assume_utc()))
    }

    /// Date-only value pinned to 12:00 UTC so that most recipient timezones
    /// still observe the same calendar date.
    pub fn midday(date: Date) -> Self {
        Self(PrimitiveDateTime::new(date, time!(12:00)).assume_utc())
    }

    /// Compact `YYYYMMDD` date with no time of day, pinned to midday.
    pub fn midday_from_compact(date: &str) -> Result<Self, ValidationError> {
        Date::parse(date.trim(), format_description!("[year][month][day]"))
            .map(Self::midday)
            .map_err(|_| ValidationError::InvalidCarrierTimestamp {
                value: date.to_owned(),
            })
    }

    pub fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    pub fn format_rfc3339(self) -> String {
        self.0
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.0.unix_timestamp().to_string())
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_rfc3339())
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_rfc3339())
    }
}

impl<'de> Deserialize<'de> for UtcDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}
