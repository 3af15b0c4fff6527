//! # Domain Models
//!
//! Canonical value types shared by every carrier adapter.
//!
//! ## Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Address`] | Postal address (request) or best-effort event location (tracking) |
//! | [`Length`], [`Weight`] | Unit-tagged decimal measurements |
//! | [`Parcel`] | Three lengths and a weight |
//! | [`Money`] | Integer minor units plus ISO currency |
//! | [`Quote`] | Priced offer for one service |
//! | [`TrackingActivity`] | One event in a shipment history |
//! | [`Tracking`] | Normalized shipment history, most-recent-first |
//! | [`TrackingResult`] | Success/error outcome for one tracking number |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! ## Validation
//!
//! Request-side values validate at construction time; carrier-reported values
//! (event addresses, for instance) are taken as reported.
//!
//! ```rust,ignore
//! use carrierkit_core::{Money, ValidationError};
//!
//! let price = Money::from_decimal_str("12.345", "usd")?;
//! assert_eq!(price.minor_units(), 1235);
//! assert_eq!(price.currency(), "USD");
//! ```

mod address;
mod measure;
mod models;
mod money;
mod parcel;
mod timestamp;

pub use address::{validate_country_code, Address};
pub use measure::{
    convert, format_wire, Length, LengthUnit, Measure, Unit, UnitSystem, Weight, WeightUnit,
    WIRE_PRECISION,
};
pub use models::{
    Quote, Tracking, TrackingActivity, TrackingOutcome, TrackingResult, TrackingStatus,
};
pub use money::{validate_currency_code, Money};
pub use parcel::Parcel;
pub use timestamp::UtcDateTime;
