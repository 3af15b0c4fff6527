//! Carrier adapter contract and request/response types.
//!
//! This module defines the [`Carrier`] trait every carrier implementation
//! satisfies, along with the request types and the structured error each
//! operation resolves with.
//!
//! # Operations
//!
//! | Operation | Request | Response |
//! |-----------|---------|----------|
//! | Quotes | [`QuoteRequest`] | `Vec<Quote>` |
//! | Tracking | tracking numbers + [`TrackingOptions`] | `Vec<TrackingResult>` |
//! | Create shipment | [`ShipmentRequest`] | [`Label`] |
//! | Cancel shipment | shipment id + data | `()` |
//! | Create pickup | [`PickupRequest`] | [`Pickup`] |
//! | Cancel pickup | confirmation number | `()` |
//! | Proof of delivery | tracking number | [`ProofOfDelivery`] |
//! | Available services | [`Address`] pair | `Vec<ServiceOffering>` |
//!
//! Only quotes and tracking are required. Every other operation defaults to a
//! [`CarrierErrorKind::NotImplemented`] failure, never an empty success.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::http_client::HttpError;
use crate::{Address, CarrierId, Parcel, Quote, TrackingResult, UtcDateTime, ValidationError};

/// Boxed future returned by every carrier operation.
pub type CarrierFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CarrierError>> + Send + 'a>>;

/// Carrier operation, used for capability checks and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Quotes,
    Tracking,
    CreateShipment,
    CancelShipment,
    CreatePickup,
    CancelPickup,
    ProofOfDelivery,
    AvailableServices,
}

impl Operation {
    pub const ALL: [Self; 8] = [
        Self::Quotes,
        Self::Tracking,
        Self::CreateShipment,
        Self::CancelShipment,
        Self::CreatePickup,
        Self::CancelPickup,
        Self::ProofOfDelivery,
        Self::AvailableServices,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quotes => "quotes",
            Self::Tracking => "tracking",
            Self::CreateShipment => "create_shipment",
            Self::CancelShipment => "cancel_shipment",
            Self::CreatePickup => "create_pickup",
            Self::CancelPickup => "cancel_pickup",
            Self::ProofOfDelivery => "proof_of_delivery",
            Self::AvailableServices => "available_services",
        }
    }

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported operation matrix for a carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilitySet(u16);

impl CapabilitySet {
    /// Quotes and tracking, the operations every carrier implements.
    pub const fn core() -> Self {
        Self(Operation::Quotes.bit() | Operation::Tracking.bit())
    }

    pub const fn with(self, operation: Operation) -> Self {
        Self(self.0 | operation.bit())
    }

    pub const fn supports(self, operation: Operation) -> bool {
        self.0 & operation.bit() != 0
    }

    pub fn supported_operations(self) -> Vec<&'static str> {
        Operation::ALL
            .into_iter()
            .filter(|operation| self.supports(*operation))
            .map(Operation::as_str)
            .collect()
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierErrorKind {
    /// The carrier response lacks a node the normalizer requires.
    Structural,
    /// The caller passed something this carrier's contract forbids.
    PreconditionViolation,
    /// The carrier adapter does not implement the operation.
    NotImplemented,
    /// The transport failed before a response was received.
    Transport,
    /// The carrier answered with an error for this request.
    Rejected,
    /// A canonical request value failed validation.
    InvalidRequest,
    AdapterNotRegistered,
}

/// Structured carrier error. Structural and rejected errors always carry the raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierError {
    kind: CarrierErrorKind,
    message: String,
    raw_body: Option<String>,
}

impl CarrierError {
    pub fn structural(message: impl Into<String>, raw_body: impl Into<String>) -> Self {
        Self {
            kind: CarrierErrorKind::Structural,
            message: message.into(),
            raw_body: Some(raw_body.into()),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self {
            kind: CarrierErrorKind::PreconditionViolation,
            message: message.into(),
            raw_body: None,
        }
    }

    pub fn not_implemented(carrier: CarrierId, operation: Operation) -> Self {
        Self {
            kind: CarrierErrorKind::NotImplemented,
            message: format!("operation '{operation}' is not implemented by carrier '{carrier}'"),
            raw_body: None,
        }
    }

    pub fn transport(carrier: CarrierId, error: HttpError) -> Self {
        Self {
            kind: CarrierErrorKind::Transport,
            message: format!("{carrier} transport error: {}", error.message()),
            raw_body: None,
        }
    }

    pub fn rejected(message: impl Into<String>, raw_body: impl Into<String>) -> Self {
        Self {
            kind: CarrierErrorKind::Rejected,
            message: message.into(),
            raw_body: Some(raw_body.into()),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: CarrierErrorKind::InvalidRequest,
            message: message.into(),
            raw_body: None,
        }
    }

    pub fn adapter_not_registered(carrier: CarrierId) -> Self {
        Self {
            kind: CarrierErrorKind::AdapterNotRegistered,
            message: format!("carrier adapter '{carrier}' is not registered"),
            raw_body: None,
        }
    }

    pub const fn kind(&self) -> CarrierErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Raw carrier body kept for manual inspection.
    pub fn raw_body(&self) -> Option<&str> {
        self.raw_body.as_deref()
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            CarrierErrorKind::Structural => "carrier.structural",
            CarrierErrorKind::PreconditionViolation => "carrier.precondition_violation",
            CarrierErrorKind::NotImplemented => "carrier.not_implemented",
            CarrierErrorKind::Transport => "carrier.transport",
            CarrierErrorKind::Rejected => "carrier.rejected",
            CarrierErrorKind::InvalidRequest => "carrier.invalid_request",
            CarrierErrorKind::AdapterNotRegistered => "carrier.adapter_not_registered",
        }
    }
}

impl Display for CarrierError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for CarrierError {}

impl From<ValidationError> for CarrierError {
    fn from(error: ValidationError) -> Self {
        Self::invalid_request(error.to_string())
    }
}

/// Request payload for quote operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub sender: Address,
    pub recipient: Address,
    pub parcels: Vec<Parcel>,
}

impl QuoteRequest {
    pub fn new(
        sender: Address,
        recipient: Address,
        parcels: Vec<Parcel>,
    ) -> Result<Self, ValidationError> {
        if parcels.is_empty() {
            return Err(ValidationError::EmptyParcels);
        }
        Ok(Self {
            sender,
            recipient,
            parcels,
        })
    }
}

/// Tracking detail level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingOptions {
    /// Full activity history when true, latest activity only otherwise.
    pub all_activity: bool,
}

impl Default for TrackingOptions {
    fn default() -> Self {
        Self { all_activity: true }
    }
}

/// Request payload for shipment creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipmentRequest {
    pub sender: Address,
    pub recipient: Address,
    pub parcels: Vec<Parcel>,
    pub service_code: String,
}

/// Label produced by shipment creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub shipment_id: String,
    pub tracking_numbers: Vec<String>,
    /// Carrier-encoded label image, passed through undecoded.
    pub image: String,
}

/// Request payload for pickup scheduling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupRequest {
    pub address: Address,
    pub parcels: Vec<Parcel>,
    pub ready_at: UtcDateTime,
    pub close_at: UtcDateTime,
}

/// Scheduled pickup confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pickup {
    pub confirmation_number: String,
}

/// Signed proof of delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofOfDelivery {
    pub tracking_number: String,
    pub signed_by: Option<String>,
    pub delivered_at: Option<UtcDateTime>,
    pub document: Option<String>,
}

/// Service tier a carrier offers between two addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOffering {
    pub code: String,
    pub name: String,
}

impl ServiceOffering {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Carrier adapter contract.
///
/// Each carrier implements quotes and tracking; the remaining operations have
/// default bodies that fail with [`CarrierErrorKind::NotImplemented`].
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: adapters hold only read-only
/// configuration and may be shared across concurrent calls.
pub trait Carrier: Send + Sync {
    /// Returns the carrier identifier.
    fn id(&self) -> CarrierId;

    /// Returns the set of implemented operations.
    fn capabilities(&self) -> CapabilitySet;

    /// Fetches priced service offers, in the carrier's own order.
    ///
    /// # Errors
    ///
    /// Returns [`CarrierError`] if:
    /// - The transport fails
    /// - The response lacks the rate node, or no line carries a price
    fn get_quotes<'a>(&'a self, req: QuoteRequest) -> CarrierFuture<'a, Vec<Quote>>;

    /// Fetches tracking for the given numbers, one result per number.
    ///
    /// # Errors
    ///
    /// Returns [`CarrierError`] if:
    /// - No number is given, or more than the carrier accepts per call
    ///   (checked before any request is sent)
    /// - The transport fails
    /// - A successful response lacks the shipment node
    fn get_tracking_status<'a>(
        &'a self,
        tracking_numbers: Vec<String>,
        options: TrackingOptions,
    ) -> CarrierFuture<'a, Vec<TrackingResult>>;

    fn create_shipment<'a>(&'a self, req: ShipmentRequest) -> CarrierFuture<'a, Label> {
        let _ = req;
        not_implemented(self.id(), Operation::CreateShipment)
    }

    /// Cancels (voids) a shipment. `data` carries carrier-specific extras.
    fn cancel_shipment<'a>(
        &'a self,
        shipment_id: String,
        data: BTreeMap<String, String>,
    ) -> CarrierFuture<'a, ()> {
        let _ = (shipment_id, data);
        not_implemented(self.id(), Operation::CancelShipment)
    }

    fn create_pickup<'a>(&'a self, req: PickupRequest) -> CarrierFuture<'a, Pickup> {
        let _ = req;
        not_implemented(self.id(), Operation::CreatePickup)
    }

    fn cancel_pickup<'a>(&'a self, confirmation_number: String) -> CarrierFuture<'a, ()> {
        let _ = confirmation_number;
        not_implemented(self.id(), Operation::CancelPickup)
    }

    fn get_proof_of_delivery<'a>(
        &'a self,
        tracking_number: String,
    ) -> CarrierFuture<'a, ProofOfDelivery> {
        let _ = tracking_number;
        not_implemented(self.id(), Operation::ProofOfDelivery)
    }

    fn get_available_services<'a>(
        &'a self,
        sender: Address,
        recipient: Address,
    ) -> CarrierFuture<'a, Vec<ServiceOffering>> {
        let _ = (sender, recipient);
        not_implemented(self.id(), Operation::AvailableServices)
    }
}

fn not_implemented<'a, T: Send + 'a>(
    carrier: CarrierId,
    operation: Operation,
) -> CarrierFuture<'a, T> {
    Box::pin(async move { Err(CarrierError::not_implemented(carrier, operation)) })
}

/// Rejects an empty tracking list and lists longer than `max_per_call`.
pub fn check_tracking_numbers(
    carrier: CarrierId,
    tracking_numbers: &[String],
    max_per_call: usize,
) -> Result<(), CarrierError> {
    if tracking_numbers.is_empty() {
        return Err(CarrierError::precondition(format!(
            "{carrier} tracking requires at least one tracking number"
        )));
    }
    if tracking_numbers.len() > max_per_call {
        return Err(CarrierError::precondition(format!(
            "{carrier} accepts at most {max_per_call} tracking number(s) per call, got {}",
            tracking_numbers.len()
        )));
    }
    if tracking_numbers.iter().any(|number| number.trim().is_empty()) {
        return Err(ValidationError::EmptyTrackingNumber.into());
    }
    Ok(())
}
