use std::collections::BTreeMap;
use std::sync::Arc;

use carrierkit_core::{
    Address, Carrier, CarrierErrorKind, CarrierId, DhlCarrier, DhlConfig, HttpClient, Length,
    LengthUnit, MockHttpClient, Operation, Parcel, PickupRequest, ShipmentRequest,
    TrackingOptions, UpsCarrier, UpsConfig, UtcDateTime, Weight, WeightUnit,
};

#[derive(Clone)]
struct CarrierCase {
    id: CarrierId,
    carrier: Arc<dyn Carrier>,
    client: Arc<MockHttpClient>,
    max_tracking_numbers: usize,
    supports_cancel_shipment: bool,
}

fn carrier_cases() -> Vec<CarrierCase> {
    let ups_client = Arc::new(MockHttpClient::ok("{}"));
    let dhl_client = Arc::new(MockHttpClient::ok("<x/>"));
    let ups_transport: Arc<dyn HttpClient> = ups_client.clone();
    let dhl_transport: Arc<dyn HttpClient> = dhl_client.clone();

    vec![
        CarrierCase {
            id: CarrierId::Ups,
            carrier: Arc::new(UpsCarrier::new(
                UpsConfig::new("license", "user", "secret"),
                ups_transport,
            )),
            client: ups_client,
            max_tracking_numbers: 1,
            supports_cancel_shipment: true,
        },
        CarrierCase {
            id: CarrierId::Dhl,
            carrier: Arc::new(DhlCarrier::new(DhlConfig::new("site", "secret"), dhl_transport)),
            client: dhl_client,
            max_tracking_numbers: 10,
            supports_cancel_shipment: false,
        },
    ]
}

fn address(country: &str) -> Address {
    Address::new(vec![String::from("1 Main St")], "City", "", "12345", country)
        .expect("valid address")
}

fn parcel() -> Parcel {
    Parcel::new(
        Length::parse("10", LengthUnit::Centimeter).expect("valid"),
        Length::parse("10", LengthUnit::Centimeter).expect("valid"),
        Length::parse("10", LengthUnit::Centimeter).expect("valid"),
        Weight::parse("1", WeightUnit::Kilogram).expect("valid"),
    )
}

#[tokio::test]
async fn every_carrier_reports_its_identity_and_core_capabilities() {
    for case in carrier_cases() {
        assert_eq!(case.carrier.id(), case.id);

        let capabilities = case.carrier.capabilities();
        assert!(capabilities.supports(Operation::Quotes), "{}", case.id);
        assert!(capabilities.supports(Operation::Tracking), "{}", case.id);
        assert!(capabilities.supports(Operation::AvailableServices), "{}", case.id);
        assert_eq!(
            capabilities.supports(Operation::CancelShipment),
            case.supports_cancel_shipment,
            "{}",
            case.id
        );
    }
}

#[tokio::test]
async fn tracking_limits_are_enforced_before_any_request() {
    for case in carrier_cases() {
        let too_many: Vec<String> = (0..=case.max_tracking_numbers)
            .map(|index| format!("TRK{index:08}"))
            .collect();

        let error = case
            .carrier
            .get_tracking_status(too_many, TrackingOptions::default())
            .await
            .expect_err("limit must be enforced");
        assert_eq!(error.kind(), CarrierErrorKind::PreconditionViolation, "{}", case.id);

        let error = case
            .carrier
            .get_tracking_status(Vec::new(), TrackingOptions::default())
            .await
            .expect_err("empty list must be rejected");
        assert_eq!(error.kind(), CarrierErrorKind::PreconditionViolation, "{}", case.id);

        assert_eq!(case.client.request_count(), 0, "{}", case.id);
    }
}

#[tokio::test]
async fn unimplemented_operations_fail_instead_of_returning_empty_success() {
    for case in carrier_cases() {
        let shipment = ShipmentRequest {
            sender: address("US"),
            recipient: address("US"),
            parcels: vec![parcel()],
            service_code: String::from("03"),
        };
        let error = case
            .carrier
            .create_shipment(shipment)
            .await
            .expect_err("not implemented");
        assert_eq!(error.kind(), CarrierErrorKind::NotImplemented, "{}", case.id);

        let pickup = PickupRequest {
            address: address("US"),
            parcels: vec![parcel()],
            ready_at: UtcDateTime::parse("2024-01-05T09:00:00Z").expect("timestamp"),
            close_at: UtcDateTime::parse("2024-01-05T17:00:00Z").expect("timestamp"),
        };
        let error = case
            .carrier
            .create_pickup(pickup)
            .await
            .expect_err("not implemented");
        assert_eq!(error.kind(), CarrierErrorKind::NotImplemented, "{}", case.id);

        let error = case
            .carrier
            .get_proof_of_delivery(String::from("TRK1"))
            .await
            .expect_err("not implemented");
        assert_eq!(error.kind(), CarrierErrorKind::NotImplemented, "{}", case.id);
        assert!(error.message().contains("proof_of_delivery"));

        if !case.supports_cancel_shipment {
            let error = case
                .carrier
                .cancel_shipment(String::from("SHP1"), BTreeMap::new())
                .await
                .expect_err("not implemented");
            assert_eq!(error.kind(), CarrierErrorKind::NotImplemented, "{}", case.id);
        }

        assert_eq!(case.client.request_count(), 0, "{}", case.id);
    }
}

#[tokio::test]
async fn available_services_are_never_empty() {
    for case in carrier_cases() {
        for (from, to) in [("US", "US"), ("DE", "DE"), ("DE", "US")] {
            let services = case
                .carrier
                .get_available_services(address(from), address(to))
                .await
                .expect("catalogue lookup");
            assert!(!services.is_empty(), "{} {from}->{to}", case.id);
            assert!(services.iter().all(|service| !service.name.is_empty()));
        }
    }
}
