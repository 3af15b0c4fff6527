//! # Carrierkit Core
//!
//! Carrier adapters and response normalization for shipping quotes and
//! tracking.
//!
//! ## Overview
//!
//! Each carrier speaks its own wire format, unit system and status
//! vocabulary. This crate hides them behind one asynchronous contract:
//!
//! - **Canonical domain models** for addresses, parcels, money, quotes and tracking
//! - **Exact measurement conversion** with two-decimal wire formatting
//! - **Carrier adapter trait** with default `NotImplemented` operations
//! - **UPS and DHL Express adapters** (JSON and XML-PI)
//! - **Registry** dispatching requests by carrier id
//! - **Pluggable error formatting** for failed tracking lookups
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | UPS and DHL Express adapters |
//! | [`carrier`] | Carrier trait, request types and `CarrierError` |
//! | [`carrier_id`] | Carrier identifiers |
//! | [`domain`] | Domain models (Address, Parcel, Money, Quote, Tracking) |
//! | [`error`] | Validation errors |
//! | [`error_format`] | Tracking error message strategies |
//! | [`http_client`] | HTTP client abstraction |
//! | [`normalize`] | Shared JSON normalization steps |
//! | [`registry`] | Adapter registry |
//! | [`xml`] | XML extraction and escaping |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use carrierkit_core::{
//!     Address, Carrier, Length, LengthUnit, Parcel, QuoteRequest, ReqwestHttpClient,
//!     UpsCarrier, UpsConfig, Weight, WeightUnit,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ups = UpsCarrier::new(
//!         UpsConfig::new("license", "user", "password"),
//!         Arc::new(ReqwestHttpClient::new()),
//!     );
//!
//!     let parcel = Parcel::new(
//!         Length::parse("10", LengthUnit::Inch)?,
//!         Length::parse("6", LengthUnit::Inch)?,
//!         Length::parse("4", LengthUnit::Inch)?,
//!         Weight::parse("2", WeightUnit::Pound)?,
//!     );
//!     let sender = Address::new(vec!["1 Main St".into()], "Atlanta", "GA", "30301", "US")?;
//!     let recipient = Address::new(vec!["9 Elm St".into()], "Boston", "MA", "02101", "US")?;
//!
//!     for quote in ups.get_quotes(QuoteRequest::new(sender, recipient, vec![parcel])?).await? {
//!         println!("{} {}", quote.service_code, quote.price);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Caller         │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Carrier Registry│
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Carrier         │────▶│ HTTP Client      │
//! │ (Adapter Trait) │     │ (reqwest/mock)   │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Normalizer      │
//! │ (Quote,Tracking)│
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Adapter operations resolve to `Result<_, CarrierError>`:
//!
//! ```rust
//! use carrierkit_core::{CarrierError, CarrierErrorKind};
//!
//! fn handle_error(error: CarrierError) {
//!     match error.kind() {
//!         CarrierErrorKind::Structural => {
//!             // Inspect error.raw_body()
//!         }
//!         CarrierErrorKind::PreconditionViolation => {
//!             // Split the request
//!         }
//!         CarrierErrorKind::NotImplemented => {
//!             // Pick another carrier
//!         }
//!         _ => {}
//!     }
//! }
//! ```
//!
//! Failed tracking lookups are not errors: they come back as
//! [`TrackingResult`] values with an `Error` outcome and the raw body.
//!
//! ## Logging
//!
//! Adapters emit `tracing` events; installing a subscriber is up to the caller.

pub mod adapters;
pub mod carrier;
pub mod carrier_id;
pub mod domain;
pub mod error;
pub mod error_format;
pub mod http_client;
pub mod normalize;
pub mod registry;
pub mod xml;

// Adapter implementations
pub use adapters::{DhlCarrier, DhlConfig, UpsCarrier, UpsConfig};

// Carrier trait and types
pub use carrier::{
    check_tracking_numbers, CapabilitySet, Carrier, CarrierError, CarrierErrorKind,
    CarrierFuture, Label, Operation, Pickup, PickupRequest, ProofOfDelivery, QuoteRequest,
    ServiceOffering, ShipmentRequest, TrackingOptions,
};

// Carrier identifiers
pub use carrier_id::CarrierId;

// Domain models
pub use domain::{
    convert, format_wire, validate_country_code, validate_currency_code, Address, Length,
    LengthUnit, Measure, Money, Parcel, Quote, Tracking, TrackingActivity, TrackingOutcome,
    TrackingResult, TrackingStatus, Unit, UnitSystem, UtcDateTime, Weight, WeightUnit,
    WIRE_PRECISION,
};

// Error types
pub use error::ValidationError;

// Error formatting
pub use error_format::{DhlConditionFormatter, ErrorFormatter, RawBodyFormatter, UpsFaultFormatter};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, MockHttpClient,
    ReqwestHttpClient,
};

// Registry
pub use registry::{CarrierRegistry, CarrierRegistryBuilder, CarrierSnapshot};
