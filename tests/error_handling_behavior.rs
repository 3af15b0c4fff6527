//! Behavior-driven tests for error classification
//!
//! Every failure must be distinguishable by kind, and carrier bodies must
//! never be discarded.

use std::collections::BTreeMap;
use std::sync::Arc;

use carrierkit_core::{
    Address, CarrierErrorKind, CarrierId, CarrierRegistry, CarrierRegistryBuilder, DhlConfig,
    HttpError, HttpResponse, Length, LengthUnit, MockHttpClient, Money, Parcel, QuoteRequest,
    TrackingOptions, UpsConfig, ValidationError, Weight, WeightUnit,
};

fn request() -> QuoteRequest {
    let parcel = Parcel::new(
        Length::parse("10", LengthUnit::Centimeter).expect("valid"),
        Length::parse("10", LengthUnit::Centimeter).expect("valid"),
        Length::parse("10", LengthUnit::Centimeter).expect("valid"),
        Weight::parse("1", WeightUnit::Kilogram).expect("valid"),
    );
    let address = Address::new(Vec::new(), "Bonn", "", "53113", "DE").expect("valid address");
    QuoteRequest::new(address.clone(), address, vec![parcel]).expect("valid request")
}

fn registry(client: Arc<MockHttpClient>) -> CarrierRegistry {
    CarrierRegistryBuilder::new()
        .with_http_client(client)
        .with_ups(UpsConfig::new("l", "u", "p"))
        .with_dhl(DhlConfig::new("site", "secret"))
        .build()
}

// =============================================================================
// Transport and carrier failures
// =============================================================================

#[tokio::test]
async fn when_transport_fails_every_carrier_reports_transport_error() {
    // Given: a transport that cannot connect
    let client = Arc::new(MockHttpClient::failing(HttpError::new("dns failure")));
    let registry = registry(client);

    for carrier in CarrierId::ALL {
        // When: quotes and tracking are requested
        let quotes = registry.quotes(carrier, request()).await;
        let tracking = registry
            .tracking(carrier, vec![String::from("1234567890")], TrackingOptions::default())
            .await;

        // Then: both fail with the transport kind and the transport message
        let error = quotes.expect_err("transport failure");
        assert_eq!(error.kind(), CarrierErrorKind::Transport, "{carrier}");
        assert!(error.message().contains("dns failure"));
        assert_eq!(error.raw_body(), None);

        let error = tracking.expect_err("transport failure");
        assert_eq!(error.kind(), CarrierErrorKind::Transport, "{carrier}");
    }
}

#[tokio::test]
async fn when_body_cannot_be_decoded_error_is_structural_with_body() {
    let client = Arc::new(MockHttpClient::ok("<html>maintenance</html>"));
    let registry = registry(client);

    for carrier in CarrierId::ALL {
        let error = registry
            .quotes(carrier, request())
            .await
            .expect_err("undecodable body");
        assert_eq!(error.kind(), CarrierErrorKind::Structural, "{carrier}");
        assert_eq!(error.raw_body(), Some("<html>maintenance</html>"));
    }
}

#[tokio::test]
async fn when_tracking_gets_server_error_result_keeps_raw_body() {
    let client = Arc::new(MockHttpClient::responding(HttpResponse::new(
        502,
        "Bad Gateway",
    )));
    let registry = registry(client);

    for carrier in CarrierId::ALL {
        let results = registry
            .tracking(carrier, vec![String::from("1234567890")], TrackingOptions::default())
            .await
            .expect("error result rather than failure");
        assert_eq!(results.len(), 1);
        assert!(!results[0].is_success(), "{carrier}");
        assert_eq!(results[0].raw_body, "Bad Gateway");
        assert!(results[0].tracking.is_none());
    }
}

#[tokio::test]
async fn when_ups_refuses_void_error_is_rejected() {
    let body = r#"{"VoidShipmentResponse":{"Response":{"ResponseStatus":{"Code":"0","Description":"Shipment already picked up"}}}}"#;
    let client = Arc::new(MockHttpClient::ok(body));
    let registry = registry(client);

    let error = registry
        .cancel_shipment(CarrierId::Ups, String::from("1Z999"), BTreeMap::new())
        .await
        .expect_err("void refused");

    assert_eq!(error.kind(), CarrierErrorKind::Rejected);
    assert!(error.message().contains("Shipment already picked up"));
    assert_eq!(error.raw_body(), Some(body));
}

#[tokio::test]
async fn when_dhl_is_asked_to_void_it_is_not_implemented() {
    let client = Arc::new(MockHttpClient::ok("<x/>"));
    let registry = registry(client.clone());

    let error = registry
        .cancel_shipment(CarrierId::Dhl, String::from("SHP1"), BTreeMap::new())
        .await
        .expect_err("not implemented");

    assert_eq!(error.kind(), CarrierErrorKind::NotImplemented);
    assert_eq!(error.code(), "carrier.not_implemented");
    assert_eq!(client.request_count(), 0);
}

// =============================================================================
// Caller errors
// =============================================================================

#[tokio::test]
async fn when_carrier_is_not_registered_error_names_it() {
    let registry = CarrierRegistry::default();

    let error = registry
        .tracking(CarrierId::Dhl, vec![String::from("1")], TrackingOptions::default())
        .await
        .expect_err("nothing registered");

    assert_eq!(error.kind(), CarrierErrorKind::AdapterNotRegistered);
    assert!(error.message().contains("dhl"));
}

#[tokio::test]
async fn when_tracking_number_is_blank_request_is_invalid() {
    let client = Arc::new(MockHttpClient::ok("{}"));
    let registry = registry(client.clone());

    let error = registry
        .tracking(CarrierId::Ups, vec![String::from("   ")], TrackingOptions::default())
        .await
        .expect_err("blank number");

    assert_eq!(error.kind(), CarrierErrorKind::InvalidRequest);
    assert_eq!(client.request_count(), 0);
}

#[test]
fn when_domain_values_are_malformed_validation_explains_why() {
    assert!(matches!(
        Address::new(Vec::new(), "Bonn", "", "53113", "DEU"),
        Err(ValidationError::InvalidCountryCode { .. })
    ));
    assert!(matches!(
        Money::from_decimal_str("12.00", "US"),
        Err(ValidationError::InvalidCurrency { .. })
    ));
    assert!(matches!(
        Money::from_decimal_str("twelve", "USD"),
        Err(ValidationError::InvalidAmount { .. })
    ));
    assert!(matches!(
        Weight::parse("-1", WeightUnit::Kilogram),
        Err(ValidationError::NegativeValue { .. })
    ));
    assert_eq!(
        QuoteRequest::new(Address::default(), Address::default(), Vec::new()),
        Err(ValidationError::EmptyParcels)
    );
    assert!(matches!(
        "fedex".parse::<CarrierId>(),
        Err(ValidationError::InvalidCarrier { .. })
    ));
}
