use thiserror::Error;

/// Validation errors raised while constructing domain values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("country code must be a 2-letter ISO code: '{value}'")]
    InvalidCountryCode { value: String },

    #[error("invalid carrier '{value}', expected one of ups, dhl")]
    InvalidCarrier { value: String },

    #[error("timestamp '{value}' is not RFC 3339")]
    InvalidTimestamp { value: String },
    #[error("carrier date/time '{value}' could not be parsed")]
    InvalidCarrierTimestamp { value: String },

    #[error("currency must be a 3-letter uppercase ISO code: '{value}'")]
    InvalidCurrency { value: String },
    #[error("monetary amount '{value}' is not a decimal number")]
    InvalidAmount { value: String },
    #[error("monetary amount '{value}' does not fit in minor units")]
    AmountOutOfRange { value: String },

    #[error("measurement '{value}' is not a decimal number")]
    InvalidMeasurement { value: String },
    #[error("{dimension} '{value}' is too large to convert")]
    MeasurementOutOfRange {
        dimension: &'static str,
        value: String,
    },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
    #[error("unknown {dimension} unit code '{value}'")]
    UnknownUnit {
        dimension: &'static str,
        value: String,
    },

    #[error("quote request must include at least one parcel")]
    EmptyParcels,
    #[error("tracking number cannot be empty")]
    EmptyTrackingNumber,
}
