//! DHL Express adapter over the XML-PI gateway.
//!
//! Every request is a single XML document POSTed to one servlet URL; the
//! document root selects the operation. Tracking accepts up to ten air
//! waybills per call.

mod payload;
mod response;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::carrier::{
    check_tracking_numbers, CapabilitySet, Carrier, CarrierError, CarrierFuture, Operation,
    QuoteRequest, ServiceOffering, TrackingOptions,
};
use crate::error_format::{ErrorFormatter, RawBodyFormatter};
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};
use crate::{Address, CarrierId, Quote, TrackingResult, UtcDateTime};

pub use payload::{quote_request, tracking_request, unit_system, IMPERIAL_ORIGINS};
pub use response::{parse_quotes, parse_tracking};

pub const DEFAULT_BASE_URL: &str = "https://xmlpi-ea.dhl.com/XMLShippingServlet";
pub const MAX_TRACKING_NUMBERS: usize = 10;

/// DHL global product codes and their display names.
pub const PRODUCTS: [(&str, &str); 12] = [
    ("1", "DOMESTIC EXPRESS 12:00"),
    ("D", "EXPRESS WORLDWIDE DOC"),
    ("E", "EXPRESS 9:00 NONDOC"),
    ("H", "ECONOMY SELECT"),
    ("I", "DOMESTIC EXPRESS 9:00"),
    ("K", "EXPRESS 9:00"),
    ("N", "DOMESTIC EXPRESS"),
    ("P", "EXPRESS WORLDWIDE"),
    ("T", "EXPRESS 12:00"),
    ("U", "EXPRESS WORLDWIDE EU"),
    ("X", "EXPRESS ENVELOPE"),
    ("Y", "EXPRESS 12:00 NONDOC"),
];

const DOMESTIC: [&str; 3] = ["N", "1", "I"];
const INTERNATIONAL: [&str; 8] = ["P", "D", "K", "E", "T", "Y", "H", "X"];

/// Display name for a DHL global product code.
pub fn product_name(code: &str) -> Option<&'static str> {
    let code = code.trim();
    PRODUCTS
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

/// Credentials and gateway location for the DHL adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhlConfig {
    pub site_id: String,
    pub password: String,
    pub account_number: Option<String>,
    pub base_url: String,
}

impl DhlConfig {
    pub fn new(site_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            site_id: site_id.into(),
            password: password.into(),
            account_number: None,
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }

    /// Account billed for quoted shipments; enables account-specific pricing.
    pub fn with_account_number(mut self, account_number: impl Into<String>) -> Self {
        self.account_number = Some(account_number.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// DHL Express carrier adapter.
#[derive(Clone)]
pub struct DhlCarrier {
    config: Arc<DhlConfig>,
    http_client: Arc<dyn HttpClient>,
    error_formatter: Arc<dyn ErrorFormatter>,
}

impl DhlCarrier {
    pub fn new(config: DhlConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            config: Arc::new(config),
            http_client,
            error_formatter: Arc::new(RawBodyFormatter),
        }
    }

    pub fn with_error_formatter(mut self, error_formatter: Arc<dyn ErrorFormatter>) -> Self {
        self.error_formatter = error_formatter;
        self
    }

    pub fn config(&self) -> &DhlConfig {
        &self.config
    }

    async fn post_xml(&self, body: String) -> Result<HttpResponse, CarrierError> {
        debug!(carrier = "dhl", url = %self.config.base_url, "dispatching request");
        let response = self
            .http_client
            .execute(HttpRequest::post(self.config.base_url.as_str()).xml(body))
            .await
            .map_err(|error| CarrierError::transport(CarrierId::Dhl, error))?;
        debug!(carrier = "dhl", status = response.status, "received response");
        Ok(response)
    }

    async fn fetch_quotes(&self, req: QuoteRequest) -> Result<Vec<Quote>, CarrierError> {
        let body = quote_request(&self.config, &req, UtcDateTime::now())?;
        let response = self.post_xml(body).await?;
        if !response.is_success() {
            return Err(CarrierError::rejected(
                format!("DHL quote request failed with status {}", response.status),
                response.body,
            ));
        }
        parse_quotes(&response.body)
    }

    async fn fetch_tracking(
        &self,
        tracking_numbers: Vec<String>,
        options: TrackingOptions,
    ) -> Result<Vec<TrackingResult>, CarrierError> {
        check_tracking_numbers(CarrierId::Dhl, &tracking_numbers, MAX_TRACKING_NUMBERS)?;

        let body = tracking_request(&self.config, &tracking_numbers, options, UtcDateTime::now());
        let response = self.post_xml(body).await?;

        let results = if response.is_success() {
            parse_tracking(&tracking_numbers, &response.body, self.error_formatter.as_ref())?
        } else {
            let message = self.error_formatter.format(&response.body);
            tracking_numbers
                .iter()
                .map(|number| {
                    TrackingResult::error(number.trim(), response.body.as_str(), message.as_str())
                })
                .collect()
        };

        for result in results.iter().filter(|result| !result.is_success()) {
            warn!(
                carrier = "dhl",
                tracking_number = %result.tracking_number,
                message = result.error_message.as_deref().unwrap_or_default(),
                "tracking lookup failed"
            );
        }
        Ok(results)
    }
}

/// Products DHL offers on a lane: domestic products within one country,
/// international ones otherwise.
pub fn available_services(sender: &Address, recipient: &Address) -> Vec<ServiceOffering> {
    let codes: &[&str] = if sender.country.trim().eq_ignore_ascii_case(recipient.country.trim()) {
        &DOMESTIC
    } else {
        &INTERNATIONAL
    };

    codes
        .iter()
        .filter_map(|code| product_name(code).map(|name| ServiceOffering::new(*code, name)))
        .collect()
}

impl Carrier for DhlCarrier {
    fn id(&self) -> CarrierId {
        CarrierId::Dhl
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::core().with(Operation::AvailableServices)
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

    fn get_available_services<'a>(
        &'a self,
        sender: Address,
        recipient: Address,
    ) -> CarrierFuture<'a, Vec<ServiceOffering>> {
        Box::pin(async move { Ok(available_services(&sender, &recipient)) })
    }
}
