//! UPS adapter over the JSON Rate, Track and Void endpoints.
//!
//! Tracking is one inquiry number per call. Quotes use the `Shop` option so
//! every service available between the two addresses is priced at once.

mod payload;
mod response;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::carrier::{
    check_tracking_numbers, CapabilitySet, Carrier, CarrierError, CarrierFuture, Operation,
    QuoteRequest, ServiceOffering, TrackingOptions,
};
use crate::error_format::{ErrorFormatter, RawBodyFormatter};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::{Address, CarrierId, Quote, TrackingResult};

pub use payload::{unit_system, IMPERIAL_ORIGINS};
pub use response::{parse_quotes, parse_tracking, parse_void};

pub const DEFAULT_BASE_URL: &str = "https://onlinetools.ups.com";
pub const MAX_TRACKING_NUMBERS: usize = 1;

const RATE_PATH: &str = "/rest/Rate";
const TRACK_PATH: &str = "/rest/Track";
const VOID_PATH: &str = "/rest/Void";

/// UPS service codes and their display names.
pub const SERVICES: [(&str, &str); 12] = [
    ("01", "Next Day Air"),
    ("02", "2nd Day Air"),
    ("03", "Ground"),
    ("07", "Worldwide Express"),
    ("08", "Worldwide Expedited"),
    ("11", "Standard"),
    ("12", "3 Day Select"),
    ("13", "Next Day Air Saver"),
    ("14", "Next Day Air Early"),
    ("54", "Worldwide Express Plus"),
    ("59", "2nd Day Air A.M."),
    ("65", "Saver"),
];

const DOMESTIC_US: [&str; 7] = ["01", "02", "03", "12", "13", "14", "59"];
const DOMESTIC_OTHER: [&str; 3] = ["11", "65", "07"];
const INTERNATIONAL: [&str; 5] = ["07", "08", "11", "54", "65"];

/// Display name for a UPS service code.
pub fn service_name(code: &str) -> Option<&'static str> {
    SERVICES
        .iter()
        .find(|(candidate, _)| *candidate == code.trim())
        .map(|(_, name)| *name)
}

/// Credentials and account options for the UPS adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsConfig {
    pub access_license_number: String,
    pub username: String,
    pub password: String,
    pub shipper_number: Option<String>,
    pub negotiated_rates: bool,
    pub base_url: String,
}

impl UpsConfig {
    pub fn new(
        access_license_number: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            access_license_number: access_license_number.into(),
            username: username.into(),
            password: password.into(),
            shipper_number: None,
            negotiated_rates: false,
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }

    pub fn with_shipper_number(mut self, shipper_number: impl Into<String>) -> Self {
        self.shipper_number = Some(shipper_number.into());
        self
    }

    /// Requests account-specific rates. Only honoured with a shipper number.
    pub fn with_negotiated_rates(mut self, enabled: bool) -> Self {
        self.negotiated_rates = enabled;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub(crate) fn negotiated_rates_entitled(&self) -> bool {
        self.negotiated_rates
            && self
                .shipper_number
                .as_deref()
                .is_some_and(|number| !number.trim().is_empty())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// UPS carrier adapter.
#[derive(Clone)]
pub struct UpsCarrier {
    config: Arc<UpsConfig>,
    http_client: Arc<dyn HttpClient>,
    error_formatter: Arc<dyn ErrorFormatter>,
}

impl UpsCarrier {
    pub fn new(config: UpsConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            config: Arc::new(config),
            http_client,
            error_formatter: Arc::new(RawBodyFormatter),
        }
    }

    /// Replaces the strategy used for tracking error messages.
    pub fn with_error_formatter(mut self, error_formatter: Arc<dyn ErrorFormatter>) -> Self {
        self.error_formatter = error_formatter;
        self
    }

    pub fn config(&self) -> &UpsConfig {
        &self.config
    }

    async fn post_json(&self, path: &str, body: String) -> Result<HttpResponse, CarrierError> {
        let url = self.config.endpoint(path);
        debug!(carrier = "ups", %url, "dispatching request");
        let response = self
            .http_client
            .execute(HttpRequest::post(url).json(body))
            .await
            .map_err(|error| CarrierError::transport(CarrierId::Ups, error))?;
        debug!(carrier = "ups", status = response.status, "received response");
        Ok(response)
    }

    async fn fetch_quotes(&self, req: QuoteRequest) -> Result<Vec<Quote>, CarrierError> {
        let body = payload::rate_request(&self.config, &req)?;
        let response = self.post_json(RATE_PATH, body).await?;
        if !response.is_success() {
            return Err(CarrierError::rejected(
                format!("UPS rate request failed with status {}", response.status),
                response.body,
            ));
        }
        parse_quotes(&response.body, self.config.negotiated_rates_entitled())
    }

    async fn fetch_tracking(
        &self,
        tracking_numbers: Vec<String>,
        options: TrackingOptions,
    ) -> Result<Vec<TrackingResult>, CarrierError> {
        check_tracking_numbers(CarrierId::Ups, &tracking_numbers, MAX_TRACKING_NUMBERS)?;
        let number = tracking_numbers[0].trim().to_owned();

        let body = payload::track_request(&self.config, &number, options).map_err(|error| {
            CarrierError::invalid_request(format!("UPS track payload: {error}"))
        })?;
        let response = self.post_json(TRACK_PATH, body).await?;

        let result = if response.is_success() {
            parse_tracking(&number, &response.body, self.error_formatter.as_ref())?
        } else {
            TrackingResult::error(
                number.as_str(),
                response.body.as_str(),
                self.error_formatter.format(&response.body),
            )
        };
        if let Some(message) = &result.error_message {
            warn!(carrier = "ups", tracking_number = %number, %message, "tracking lookup failed");
        }
        Ok(vec![result])
    }

    async fn void_shipment(
        &self,
        shipment_id: String,
        data: BTreeMap<String, String>,
    ) -> Result<(), CarrierError> {
        if shipment_id.trim().is_empty() {
            return Err(CarrierError::invalid_request(
                "UPS void requires a shipment identification number",
            ));
        }
        let body = payload::void_request(&self.config, &shipment_id, &data).map_err(|error| {
            CarrierError::invalid_request(format!("UPS void payload: {error}"))
        })?;
        let response = self.post_json(VOID_PATH, body).await?;
        if !response.is_success() {
            return Err(CarrierError::rejected(
                format!("UPS void request failed with status {}", response.status),
                response.body,
            ));
        }
        parse_void(&response.body)
    }
}

/// Services UPS offers on a lane, chosen by origin and destination country.
pub fn available_services(sender: &Address, recipient: &Address) -> Vec<ServiceOffering> {
    let from = sender.country.trim();
    let to = recipient.country.trim();
    let codes: &[&str] = if !from.eq_ignore_ascii_case(to) {
        &INTERNATIONAL
    } else if from.eq_ignore_ascii_case("US") {
        &DOMESTIC_US
    } else {
        &DOMESTIC_OTHER
    };

    codes
        .iter()
        .filter_map(|code| service_name(code).map(|name| ServiceOffering::new(*code, name)))
        .collect()
}

impl Carrier for UpsCarrier {
    fn id(&self) -> CarrierId {
        CarrierId::Ups
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::core()
            .with(Operation::CancelShipment)
            .with(Operation::AvailableServices)
    }

    fn get_quotes<'a>(&'a self, req: QuoteRequest) -> CarrierFuture<'a, Vec<Quote>> {
        Box::pin(self.fetch_quotes(req))
    }

    fn get_tracking_status<'a>(
        &'a self,
        tracking_numbers: Vec<String>,
        options: TrackingOptions,
    ) -> CarrierFuture<'a, Vec<TrackingResult>> {
        Box::pin(self.fetch_tracking(tracking_numbers, options))
    }

    fn cancel_shipment<'a>(
        &'a self,
        shipment_id: String,
        data: BTreeMap<String, String>,
    ) -> CarrierFuture<'a, ()> {
        Box::pin(self.void_shipment(shipment_id, data))
    }

    fn get_available_services<'a>(
        &'a self,
        sender: Address,
        recipient: Address,
    ) -> CarrierFuture<'a, Vec<ServiceOffering>> {
        Box::pin(async move { Ok(available_services(&sender, &recipient)) })
    }
}
