//! UPS JSON request payloads.

use std::collections::BTreeMap;

use serde::Serialize;

use super::UpsConfig;
use crate::carrier::{CarrierError, QuoteRequest, TrackingOptions};
use crate::{Address, LengthUnit, Parcel, UnitSystem, ValidationError, WeightUnit};

/// Origin countries rated in inches and pounds; everything else is metric.
pub const IMPERIAL_ORIGINS: [&str; 2] = ["US", "PR"];

/// Customer-supplied packaging.
const PACKAGING_CODE: &str = "02";

pub fn unit_system(origin_country: &str) -> UnitSystem {
    UnitSystem::for_origin(
        origin_country,
        UnitSystem::Metric,
        UnitSystem::Imperial,
        &IMPERIAL_ORIGINS,
    )
}

fn length_code(unit: LengthUnit) -> &'static str {
    match unit {
        LengthUnit::Inch => "IN",
        _ => "CM",
    }
}

fn weight_code(unit: WeightUnit) -> &'static str {
    match unit {
        WeightUnit::Pound => "LBS",
        _ => "KGS",
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Security<'a> {
    username_token: UsernameToken<'a>,
    service_access_token: ServiceAccessToken<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct UsernameToken<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ServiceAccessToken<'a> {
    access_license_number: &'a str,
}

impl<'a> Security<'a> {
    fn from_config(config: &'a UpsConfig) -> Self {
        Self {
            username_token: UsernameToken {
                username: &config.username,
                password: &config.password,
            },
            service_access_token: ServiceAccessToken {
                access_license_number: &config.access_license_number,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Envelope<'a, T> {
    #[serde(rename = "UPSSecurity")]
    security: Security<'a>,
    #[serde(flatten)]
    body: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct WireAddress<'a> {
    address_line: &'a [String],
    city: &'a str,
    state_province_code: &'a str,
    postal_code: &'a str,
    country_code: &'a str,
}

impl<'a> From<&'a Address> for WireAddress<'a> {
    fn from(address: &'a Address) -> Self {
        Self {
            address_line: &address.lines,
            city: &address.city,
            state_province_code: &address.state,
            postal_code: &address.postal_code,
            country_code: &address.country,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Party<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    shipper_number: Option<&'a str>,
    address: WireAddress<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Code<'a> {
    code: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Dimensions<'a> {
    unit_of_measurement: Code<'a>,
    length: String,
    width: String,
    height: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PackageWeight<'a> {
    unit_of_measurement: Code<'a>,
    weight: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Package<'a> {
    packaging_type: Code<'a>,
    dimensions: Dimensions<'a>,
    package_weight: PackageWeight<'a>,
}

impl Package<'static> {
    fn from_parcel(parcel: &Parcel, system: UnitSystem) -> Result<Self, ValidationError> {
        let converted = parcel.convert_to_system(system)?;
        Ok(Self {
            packaging_type: Code {
                code: PACKAGING_CODE,
            },
            dimensions: Dimensions {
                unit_of_measurement: Code {
                    code: length_code(system.length_unit()),
                },
                length: converted.length.to_wire(),
                width: converted.width.to_wire(),
                height: converted.height.to_wire(),
            },
            package_weight: PackageWeight {
                unit_of_measurement: Code {
                    code: weight_code(system.weight_unit()),
                },
                weight: converted.weight.to_wire(),
            },
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct RequestOption<'a> {
    request_option: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct RatingOptions {
    negotiated_rates_indicator: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Shipment<'a> {
    shipper: Party<'a>,
    ship_to: Party<'a>,
    ship_from: Party<'a>,
    package: Vec<Package<'static>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shipment_rating_options: Option<RatingOptions>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct RateRequest<'a> {
    request: RequestOption<'a>,
    shipment: Shipment<'a>,
}

#[derive(Debug, Serialize)]
struct RateBody<'a> {
    #[serde(rename = "RateRequest")]
    rate_request: RateRequest<'a>,
}

/// Builds the `Shop` rate request: every service for the given parcels.
///
/// A parcel that cannot be expressed in the origin's unit system makes the
/// request invalid.
pub fn rate_request(config: &UpsConfig, req: &QuoteRequest) -> Result<String, CarrierError> {
    let system = unit_system(&req.sender.country);
    let shipment = Shipment {
        shipper: Party {
            shipper_number: config.shipper_number.as_deref(),
            address: WireAddress::from(&req.sender),
        },
        ship_to: Party {
            shipper_number: None,
            address: WireAddress::from(&req.recipient),
        },
        ship_from: Party {
            shipper_number: None,
            address: WireAddress::from(&req.sender),
        },
        package: req
            .parcels
            .iter()
            .map(|parcel| Package::from_parcel(parcel, system))
            .collect::<Result<_, _>>()?,
        shipment_rating_options: config
            .negotiated_rates_entitled()
            .then_some(RatingOptions {
                negotiated_rates_indicator: "",
            }),
    };

    serde_json::to_string(&Envelope {
        security: Security::from_config(config),
        body: RateBody {
            rate_request: RateRequest {
                request: RequestOption {
                    request_option: "Shop",
                },
                shipment,
            },
        },
    })
    .map_err(|error| CarrierError::invalid_request(format!("UPS rate payload: {error}")))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct TrackRequest<'a> {
    request: RequestOption<'a>,
    inquiry_number: &'a str,
}

#[derive(Debug, Serialize)]
struct TrackBody<'a> {
    #[serde(rename = "TrackRequest")]
    track_request: TrackRequest<'a>,
}

/// Builds a track request for exactly one inquiry number.
pub fn track_request(
    config: &UpsConfig,
    tracking_number: &str,
    options: TrackingOptions,
) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Envelope {
        security: Security::from_config(config),
        body: TrackBody {
            track_request: TrackRequest {
                request: RequestOption {
                    request_option: if options.all_activity { "1" } else { "0" },
                },
                inquiry_number: tracking_number.trim(),
            },
        },
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct TransactionReference<'a> {
    customer_context: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct VoidRequestHeader<'a> {
    transaction_reference: TransactionReference<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct VoidShipment<'a> {
    shipment_identification_number: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tracking_number: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct VoidShipmentRequest<'a> {
    request: VoidRequestHeader<'a>,
    void_shipment: VoidShipment<'a>,
}

#[derive(Debug, Serialize)]
struct VoidBody<'a> {
    #[serde(rename = "VoidShipmentRequest")]
    void_shipment_request: VoidShipmentRequest<'a>,
}

/// Builds a void request. `data` may carry `tracking_number` (void one
/// package of a multi-piece shipment) and `customer_context`.
pub fn void_request(
    config: &UpsConfig,
    shipment_id: &str,
    data: &BTreeMap<String, String>,
) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Envelope {
        security: Security::from_config(config),
        body: VoidBody {
            void_shipment_request: VoidShipmentRequest {
                request: VoidRequestHeader {
                    transaction_reference: TransactionReference {
                        customer_context: data
                            .get("customer_context")
                            .map(String::as_str)
                            .unwrap_or_default(),
                    },
                },
                void_shipment: VoidShipment {
                    shipment_identification_number: shipment_id.trim(),
                    tracking_number: data.get("tracking_number").map(String::as_str),
                },
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Length, Weight};
    use serde_json::Value;

    fn config() -> UpsConfig {
        UpsConfig::new("license", "user", "secret")
    }

    fn address(country: &str) -> Address {
        Address::new(vec![String::from("1 Main St")], "City", "ST", "12345", country)
            .expect("valid address")
    }

    fn request(origin: &str) -> QuoteRequest {
        let parcel = Parcel::new(
            Length::parse("10", LengthUnit::Inch).expect("valid"),
            Length::parse("6", LengthUnit::Inch).expect("valid"),
            Length::parse("4", LengthUnit::Inch).expect("valid"),
            Weight::parse("2.5", WeightUnit::Pound).expect("valid"),
        );
        QuoteRequest::new(address(origin), address("CA"), vec![parcel]).expect("valid request")
    }

    fn parse(body: &str) -> Value {
        serde_json::from_str(body).expect("payload is JSON")
    }

    #[test]
    fn us_origin_rates_in_inches_and_pounds() {
        let body = parse(&rate_request(&config(), &request("us")).expect("serializes"));
        let package = &body["RateRequest"]["Shipment"]["Package"][0];

        assert_eq!(package["Dimensions"]["UnitOfMeasurement"]["Code"], "IN");
        assert_eq!(package["Dimensions"]["Length"], "10.00");
        assert_eq!(package["PackageWeight"]["UnitOfMeasurement"]["Code"], "LBS");
        assert_eq!(package["PackageWeight"]["Weight"], "2.50");
        assert_eq!(package["PackagingType"]["Code"], "02");
    }

    #[test]
    fn other_origins_are_converted_to_metric() {
        let body = parse(&rate_request(&config(), &request("DE")).expect("serializes"));
        let package = &body["RateRequest"]["Shipment"]["Package"][0];

        assert_eq!(package["Dimensions"]["UnitOfMeasurement"]["Code"], "CM");
        assert_eq!(package["Dimensions"]["Length"], "25.40");
        assert_eq!(package["Dimensions"]["Width"], "15.24");
        assert_eq!(package["PackageWeight"]["UnitOfMeasurement"]["Code"], "KGS");
        assert_eq!(package["PackageWeight"]["Weight"], "1.13");
    }

    #[test]
    fn parcel_too_large_for_unit_system_is_invalid_request() {
        let parcel = Parcel::new(
            Length::parse("79228162514264337593543950335", LengthUnit::Inch).expect("valid"),
            Length::parse("1", LengthUnit::Inch).expect("valid"),
            Length::parse("1", LengthUnit::Inch).expect("valid"),
            Weight::parse("1", WeightUnit::Pound).expect("valid"),
        );
        let req = QuoteRequest::new(address("DE"), address("CA"), vec![parcel]).expect("valid");

        let error = rate_request(&config(), &req).expect_err("cannot convert");
        assert_eq!(error.kind(), crate::CarrierErrorKind::InvalidRequest);
        assert!(error.message().contains("too large"));
    }

    #[test]
    fn authentication_block_and_addresses_are_present() {
        let body = parse(&rate_request(&config(), &request("US")).expect("serializes"));

        assert_eq!(body["UPSSecurity"]["UsernameToken"]["Username"], "user");
        assert_eq!(
            body["UPSSecurity"]["ServiceAccessToken"]["AccessLicenseNumber"],
            "license"
        );
        assert_eq!(body["RateRequest"]["Request"]["RequestOption"], "Shop");
        assert_eq!(
            body["RateRequest"]["Shipment"]["ShipTo"]["Address"]["CountryCode"],
            "CA"
        );
        assert_eq!(
            body["RateRequest"]["Shipment"]["ShipFrom"]["Address"]["AddressLine"][0],
            "1 Main St"
        );
        assert!(body["RateRequest"]["Shipment"]["Shipper"]
            .get("ShipperNumber")
            .is_none());
        assert!(body["RateRequest"]["Shipment"]
            .get("ShipmentRatingOptions")
            .is_none());
    }

    #[test]
    fn negotiated_entitlement_adds_indicator_and_shipper_number() {
        let config = config()
            .with_shipper_number("A1B2C3")
            .with_negotiated_rates(true);
        let body = parse(&rate_request(&config, &request("US")).expect("serializes"));
        let shipment = &body["RateRequest"]["Shipment"];

        assert_eq!(shipment["Shipper"]["ShipperNumber"], "A1B2C3");
        assert_eq!(
            shipment["ShipmentRatingOptions"]["NegotiatedRatesIndicator"],
            ""
        );
    }

    #[test]
    fn track_request_carries_single_inquiry_number() {
        let body = parse(
            &track_request(&config(), " 1Z999AA10123456784 ", TrackingOptions::default())
                .expect("serializes"),
        );
        assert_eq!(body["TrackRequest"]["InquiryNumber"], "1Z999AA10123456784");
        assert_eq!(body["TrackRequest"]["Request"]["RequestOption"], "1");

        let latest_only = parse(
            &track_request(
                &config(),
                "1Z999AA10123456784",
                TrackingOptions {
                    all_activity: false,
                },
            )
            .expect("serializes"),
        );
        assert_eq!(latest_only["TrackRequest"]["Request"]["RequestOption"], "0");
    }

    #[test]
    fn void_request_includes_optional_tracking_number() {
        let mut data = BTreeMap::new();
        data.insert(String::from("tracking_number"), String::from("1Z2"));
        let body = parse(&void_request(&config(), "1Z1", &data).expect("serializes"));
        let void = &body["VoidShipmentRequest"]["VoidShipment"];

        assert_eq!(void["ShipmentIdentificationNumber"], "1Z1");
        assert_eq!(void["TrackingNumber"], "1Z2");
    }
}
