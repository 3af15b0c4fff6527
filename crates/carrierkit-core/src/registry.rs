use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::debug;

use crate::adapters::{DhlCarrier, DhlConfig, UpsCarrier, UpsConfig};
use crate::carrier::{
    CapabilitySet, Carrier, CarrierError, QuoteRequest, ServiceOffering, TrackingOptions,
};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::{Address, CarrierId, Quote, TrackingResult};

/// Registered carrier with its supported operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarrierSnapshot {
    pub id: CarrierId,
    pub name: &'static str,
    pub capabilities: CapabilitySet,
}

/// Adapter registry dispatching requests by [`CarrierId`].
#[derive(Clone, Default)]
pub struct CarrierRegistry {
    carriers: HashMap<CarrierId, Arc<dyn Carrier>>,
}

/// Builder for a [`CarrierRegistry`] sharing one transport across adapters.
///
/// # Example
///
/// ```rust,ignore
/// use carrierkit_core::{CarrierRegistryBuilder, DhlConfig, UpsConfig};
///
/// let registry = CarrierRegistryBuilder::new()
///     .with_ups(UpsConfig::new("license", "user", "password"))
///     .with_dhl(DhlConfig::new("site-id", "password"))
///     .build();
/// ```
#[derive(Default)]
pub struct CarrierRegistryBuilder {
    http_client: Option<Arc<dyn HttpClient>>,
    ups: Option<UpsConfig>,
    dhl: Option<DhlConfig>,
}

impl CarrierRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport used by every adapter; defaults to [`ReqwestHttpClient`].
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn with_ups(mut self, config: UpsConfig) -> Self {
        self.ups = Some(config);
        self
    }

    pub fn with_dhl(mut self, config: DhlConfig) -> Self {
        self.dhl = Some(config);
        self
    }

    pub fn build(self) -> CarrierRegistry {
        let http_client: Arc<dyn HttpClient> = match self.http_client {
            Some(http_client) => http_client,
            None => Arc::new(ReqwestHttpClient::default()),
        };

        let mut carriers: Vec<Arc<dyn Carrier>> = Vec::new();
        if let Some(config) = self.ups {
            carriers.push(Arc::new(UpsCarrier::new(config, Arc::clone(&http_client))));
        }
        if let Some(config) = self.dhl {
            carriers.push(Arc::new(DhlCarrier::new(config, Arc::clone(&http_client))));
        }
        CarrierRegistry::new(carriers)
    }
}

impl CarrierRegistry {
    pub fn new(carriers: Vec<Arc<dyn Carrier>>) -> Self {
        let carriers = carriers
            .into_iter()
            .map(|carrier| (carrier.id(), carrier))
            .collect();
        Self { carriers }
    }

    /// Adds or replaces the adapter for the carrier's id.
    pub fn register(&mut self, carrier: Arc<dyn Carrier>) -> Option<Arc<dyn Carrier>> {
        self.carriers.insert(carrier.id(), carrier)
    }

    pub fn get(&self, carrier: CarrierId) -> Result<&Arc<dyn Carrier>, CarrierError> {
        self.carriers
            .get(&carrier)
            .ok_or_else(|| CarrierError::adapter_not_registered(carrier))
    }

    pub fn is_registered(&self, carrier: CarrierId) -> bool {
        self.carriers.contains_key(&carrier)
    }

    /// Registered carriers in [`CarrierId::ALL`] order.
    pub fn snapshots(&self) -> Vec<CarrierSnapshot> {
        CarrierId::ALL
            .into_iter()
            .filter_map(|id| {
                self.carriers.get(&id).map(|carrier| CarrierSnapshot {
                    id,
                    name: id.display_name(),
                    capabilities: carrier.capabilities(),
                })
            })
            .collect()
    }

    pub async fn quotes(
        &self,
        carrier: CarrierId,
        req: QuoteRequest,
    ) -> Result<Vec<Quote>, CarrierError> {
        debug!(%carrier, "routing quote request");
        self.get(carrier)?.get_quotes(req).await
    }

    /// Requests quotes from every registered carrier, one after another.
    ///
    /// A failing carrier does not stop the others; its error is returned in
    /// its slot.
    pub async fn quotes_from_all(
        &self,
        req: &QuoteRequest,
    ) -> Vec<(CarrierId, Result<Vec<Quote>, CarrierError>)> {
        let mut results = Vec::with_capacity(self.carriers.len());
        for snapshot in self.snapshots() {
            let outcome = self.quotes(snapshot.id, req.clone()).await;
            results.push((snapshot.id, outcome));
        }
        results
    }

    pub async fn tracking(
        &self,
        carrier: CarrierId,
        tracking_numbers: Vec<String>,
        options: TrackingOptions,
    ) -> Result<Vec<TrackingResult>, CarrierError> {
        debug!(%carrier, count = tracking_numbers.len(), "routing tracking request");
        self.get(carrier)?
            .get_tracking_status(tracking_numbers, options)
            .await
    }

    pub async fn cancel_shipment(
        &self,
        carrier: CarrierId,
        shipment_id: String,
        data: BTreeMap<String, String>,
    ) -> Result<(), CarrierError> {
        self.get(carrier)?.cancel_shipment(shipment_id, data).await
    }

    pub async fn available_services(
        &self,
        carrier: CarrierId,
        sender: Address,
        recipient: Address,
    ) -> Result<Vec<ServiceOffering>, CarrierError> {
        self.get(carrier)?
            .get_available_services(sender, recipient)
            .await
    }
}
