//! Normalization of UPS JSON responses into canonical values.

use serde_json::Value;
use tracing::warn;

use super::service_name;
use crate::carrier::CarrierError;
use crate::error_format::{ErrorFormatter, UpsFaultFormatter};
use crate::normalize::{coerce_to_sequence, json_path, json_str, json_str_or_empty};
use crate::{
    Address, CarrierId, LengthUnit, Money, Parcel, Quote, Tracking, TrackingActivity,
    TrackingResult, TrackingStatus, UtcDateTime, Weight, WeightUnit,
};

/// `Activity.Status.Type` codes. Anything else is in transit.
const STATUS_TABLE: [(&str, TrackingStatus); 6] = [
    ("D", TrackingStatus::Delivered),
    ("X", TrackingStatus::Exception),
    ("RS", TrackingStatus::Exception),
    ("I", TrackingStatus::InTransit),
    ("P", TrackingStatus::InTransit),
    ("M", TrackingStatus::InTransit),
];

/// `DeliveryDetail.Type.Code` of the scheduled delivery date.
const SCHEDULED_DELIVERY: &str = "03";

fn parse_json(body: &str) -> Result<Value, CarrierError> {
    serde_json::from_str(body)
        .map_err(|error| CarrierError::structural(format!("UPS body is not JSON: {error}"), body))
}

/// True when the body is a UPS fault or error envelope.
pub fn is_error_body(value: &Value) -> bool {
    value.get("Fault").is_some() || json_path(value, &["response", "errors"]).is_some()
}

/// Amount and currency of `NegotiatedRateCharges.TotalCharge`.
fn negotiated_charge(
    line: &Value,
    code: &str,
    body: &str,
) -> Result<(String, String), CarrierError> {
    let missing = |field: &str| {
        CarrierError::structural(
            format!("UPS rate line {code} lacks negotiated {field}"),
            body,
        )
    };
    let charge = json_path(line, &["NegotiatedRateCharges", "TotalCharge"])
        .ok_or_else(|| missing("TotalCharge"))?;
    let amount = json_str(charge, &["MonetaryValue"]).ok_or_else(|| missing("MonetaryValue"))?;
    let currency = json_str(charge, &["CurrencyCode"]).ok_or_else(|| missing("CurrencyCode"))?;
    Ok((amount, currency))
}

/// Normalizes a rate response into quotes, in the order UPS listed them.
///
/// Lines without a service code are skipped. With `negotiated` unset, lines
/// without a total charge are skipped too; with it set, every line must carry
/// a complete negotiated total and the published charge is never read.
pub fn parse_quotes(body: &str, negotiated: bool) -> Result<Vec<Quote>, CarrierError> {
    let value = parse_json(body)?;
    if is_error_body(&value) {
        return Err(CarrierError::rejected(
            format!("UPS rejected rate request: {}", UpsFaultFormatter.format(body)),
            body,
        ));
    }

    let response = value
        .get("RateResponse")
        .ok_or_else(|| CarrierError::structural("UPS response lacks RateResponse", body))?;
    let lines = coerce_to_sequence(response.get("RatedShipment"));

    let mut quotes = Vec::with_capacity(lines.len());
    for line in lines {
        let Some(code) = json_str(line, &["Service", "Code"]) else {
            warn!("skipping UPS rate line without a service code");
            continue;
        };
        let (amount, currency) = if negotiated {
            negotiated_charge(line, &code, body)?
        } else {
            let Some(amount) = json_str(line, &["TotalCharges", "MonetaryValue"]) else {
                warn!(service = %code, "skipping UPS rate line without a total charge");
                continue;
            };
            let currency = json_str_or_empty(line, &["TotalCharges", "CurrencyCode"]);
            (amount, currency)
        };

        let price = Money::from_decimal_str(&amount, &currency).map_err(|error| {
            CarrierError::structural(format!("UPS rate line {code}: {error}"), body)
        })?;
        let name = json_str(line, &["Service", "Description"])
            .filter(|description| !description.trim().is_empty())
            .or_else(|| service_name(&code).map(str::to_owned))
            .unwrap_or_default();

        quotes.push(Quote::new(CarrierId::Ups, code, price).with_service_name(name));
    }

    if quotes.is_empty() {
        return Err(CarrierError::structural(
            "UPS response contains no priced rate lines",
            body,
        ));
    }
    Ok(quotes)
}

/// Normalizes a track response for one number.
///
/// A UPS fault becomes an error result; a body that is neither a fault nor
/// carries `TrackResponse.Shipment` is a structural error.
pub fn parse_tracking(
    tracking_number: &str,
    body: &str,
    formatter: &dyn ErrorFormatter,
) -> Result<TrackingResult, CarrierError> {
    let value = parse_json(body)?;
    if is_error_body(&value) {
        return Ok(TrackingResult::error(
            tracking_number,
            body,
            formatter.format(body),
        ));
    }

    let shipment = coerce_to_sequence(json_path(&value, &["TrackResponse", "Shipment"]))
        .into_iter()
        .next()
        .ok_or_else(|| CarrierError::structural("UPS response lacks TrackResponse.Shipment", body))?;

    let package = coerce_to_sequence(shipment.get("Package")).into_iter().next();
    let activities = package
        .map(|package| {
            coerce_to_sequence(package.get("Activity"))
                .into_iter()
                .filter_map(normalize_activity)
                .collect()
        })
        .unwrap_or_default();
    let parcels = package
        .and_then(package_weight)
        .map(|weight| vec![weight])
        .unwrap_or_default();

    let service = json_str(shipment, &["Service", "Description"])
        .filter(|description| !description.trim().is_empty())
        .or_else(|| json_str(shipment, &["Service", "Code"]))
        .unwrap_or_default();

    let tracking = Tracking::new(
        CarrierId::Ups,
        service,
        activities,
        estimated_delivery(shipment, package),
        parcels,
    );
    Ok(TrackingResult::success(tracking_number, body, tracking))
}

fn normalize_activity(activity: &Value) -> Option<TrackingActivity> {
    let date = json_str_or_empty(activity, &["Date"]);
    let time = json_str_or_empty(activity, &["Time"]);
    let timestamp = match UtcDateTime::from_compact(&date, &time) {
        Ok(timestamp) => timestamp,
        Err(error) => {
            warn!(%error, "dropping UPS activity with unreadable timestamp");
            return None;
        }
    };

    let location = json_path(activity, &["ActivityLocation", "Address"]);
    let field = |key: &str| {
        location
            .and_then(|address| json_str(address, &[key]))
            .unwrap_or_default()
    };

    Some(TrackingActivity {
        status: TrackingStatus::from_code(
            &json_str_or_empty(activity, &["Status", "Type"]),
            &STATUS_TABLE,
        ),
        description: json_str_or_empty(activity, &["Status", "Description"]),
        timestamp,
        address: Address::reported(
            field("City"),
            field("StateProvinceCode"),
            field("PostalCode"),
            field("CountryCode"),
        ),
    })
}

fn package_weight(package: &Value) -> Option<Parcel> {
    let value = json_str(package, &["PackageWeight", "Weight"])?;
    let code = json_str_or_empty(package, &["PackageWeight", "UnitOfMeasurement", "Code"]);
    let unit = match WeightUnit::from_code(&code) {
        Ok(unit) => unit,
        Err(error) => {
            warn!(%error, "ignoring UPS package weight");
            return None;
        }
    };
    let weight = Weight::parse(&value, unit)
        .map_err(|error| warn!(%error, "ignoring UPS package weight"))
        .ok()?;
    let length_unit = match unit {
        WeightUnit::Pound | WeightUnit::Ounce => LengthUnit::Inch,
        _ => LengthUnit::Centimeter,
    };
    Some(Parcel::weight_only(weight, length_unit))
}

fn estimated_delivery(shipment: &Value, package: Option<&Value>) -> Option<UtcDateTime> {
    let details = coerce_to_sequence(shipment.get("DeliveryDetail"))
        .into_iter()
        .chain(package.into_iter().flat_map(|package| {
            coerce_to_sequence(package.get("DeliveryDetail"))
        }));

    details
        .filter(|detail| {
            json_str(detail, &["Type", "Code"]).as_deref() == Some(SCHEDULED_DELIVERY)
        })
        .find_map(|detail| {
            let date = json_str(detail, &["Date"])?;
            let parsed = match json_str(detail, &["Time"]) {
                Some(time) if !time.trim().is_empty() => UtcDateTime::from_compact(&date, &time),
                _ => UtcDateTime::midday_from_compact(&date),
            };
            parsed
                .map_err(|error| warn!(%error, "ignoring UPS delivery estimate"))
                .ok()
        })
}

/// Void succeeds only on `ResponseStatus.Code` `"1"`.
pub fn parse_void(body: &str) -> Result<(), CarrierError> {
    let value = parse_json(body)?;
    if is_error_body(&value) {
        return Err(CarrierError::rejected(
            format!("UPS rejected void request: {}", UpsFaultFormatter.format(body)),
            body,
        ));
    }

    let status = json_path(
        &value,
        &["VoidShipmentResponse", "Response", "ResponseStatus"],
    )
    .ok_or_else(|| {
        CarrierError::structural("UPS response lacks VoidShipmentResponse status", body)
    })?;

    match json_str(status, &["Code"]).as_deref() {
        Some("1") => Ok(()),
        _ => Err(CarrierError::rejected(
            format!(
                "UPS did not void the shipment: {}",
                json_str_or_empty(status, &["Description"])
            ),
            body,
        )),
    }
}
