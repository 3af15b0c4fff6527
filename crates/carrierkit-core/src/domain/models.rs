use serde::{Deserialize, Serialize};

use crate::{Address, CarrierId, Money, Parcel, UtcDateTime};

/// Priced offer from one carrier for one service tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub carrier: CarrierId,
    pub service_code: String,
    pub service_name: Option<String>,
    pub price: Money,
}

impl Quote {
    pub fn new(carrier: CarrierId, service_code: impl Into<String>, price: Money) -> Self {
        Self {
            carrier,
            service_code: service_code.into(),
            service_name: None,
            price,
        }
    }

    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.service_name = Some(name);
        }
        self
    }
}

/// Canonical shipment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum TrackingStatus {
    InTransit,
    Delivered,
    Exception,
}

impl TrackingStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
            Self::Exception => "exception",
        }
    }

    /// Looks `code` up in a carrier status table, ignoring case.
    /// Unknown codes are common and map to [`TrackingStatus::InTransit`].
    pub fn from_code(code: &str, table: &[(&str, TrackingStatus)]) -> Self {
        let code = code.trim();
        table
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(code))
            .map(|(_, status)| *status)
            .unwrap_or(Self::InTransit)
    }
}

/// One timestamped event in a shipment's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingActivity {
    pub status: TrackingStatus,
    pub description: String,
    pub timestamp: UtcDateTime,
    pub address: Address,
}

/// Normalized tracking payload. `activities` is most-recent-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracking {
    pub carrier: CarrierId,
    pub service: String,
    pub activities: Vec<TrackingActivity>,
    pub estimated_delivery: Option<UtcDateTime>,
    pub parcels: Vec<Parcel>,
}

impl Tracking {
    /// Builds a tracking payload, ordering activities most-recent-first.
    ///
    /// The sort is stable, so events sharing a timestamp keep the carrier's
    /// relative order.
    pub fn new(
        carrier: CarrierId,
        service: impl Into<String>,
        mut activities: Vec<TrackingActivity>,
        estimated_delivery: Option<UtcDateTime>,
        parcels: Vec<Parcel>,
    ) -> Self {
        activities.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));
        Self {
            carrier,
            service: service.into(),
            activities,
            estimated_delivery,
            parcels,
        }
    }

    /// Status of the most recent activity.
    pub fn current_status(&self) -> Option<TrackingStatus> {
        self.activities.first().map(|activity| activity.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingOutcome {
    Success,
    Error,
}

/// Outcome of asking a carrier about one tracking number.
///
/// The raw carrier body is retained in both outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingResult {
    pub outcome: TrackingOutcome,
    pub tracking_number: String,
    pub raw_body: String,
    pub tracking: Option<Tracking>,
    pub error_message: Option<String>,
}

impl TrackingResult {
    pub fn success(
        tracking_number: impl Into<String>,
        raw_body: impl Into<String>,
        tracking: Tracking,
    ) -> Self {
        Self {
            outcome: TrackingOutcome::Success,
            tracking_number: tracking_number.into(),
            raw_body: raw_body.into(),
            tracking: Some(tracking),
            error_message: None,
        }
    }

    pub fn error(
        tracking_number: impl Into<String>,
        raw_body: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            outcome: TrackingOutcome::Error,
            tracking_number: tracking_number.into(),
            raw_body: raw_body.into(),
            tracking: None,
            error_message: Some(error_message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == TrackingOutcome::Success
    }
}
