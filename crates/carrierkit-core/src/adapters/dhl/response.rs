//! Normalization of DHL XML-PI responses into canonical values.

use roxmltree::{Document, Node};
use tracing::warn;

use super::product_name;
use crate::carrier::CarrierError;
use crate::error_format::{DhlConditionFormatter, ErrorFormatter};
use crate::normalize::split_composite;
use crate::xml::{self, text_at, text_or_empty};
use crate::{
    Address, CarrierId, LengthUnit, Money, Parcel, Quote, Tracking, TrackingActivity,
    TrackingResult, TrackingStatus, UtcDateTime, Weight, WeightUnit,
};

/// `ServiceEvent/EventCode` values. Anything else is in transit.
const EVENT_TABLE: [(&str, TrackingStatus); 8] = [
    ("OK", TrackingStatus::Delivered),
    ("BA", TrackingStatus::Exception),
    ("CA", TrackingStatus::Exception),
    ("CM", TrackingStatus::Exception),
    ("MS", TrackingStatus::Exception),
    ("NH", TrackingStatus::Exception),
    ("OH", TrackingStatus::Exception),
    ("RD", TrackingStatus::Exception),
];

const SUCCESS_STATUS: &str = "success";

fn parse_document(body: &str) -> Result<Document<'_>, CarrierError> {
    Document::parse(body)
        .map_err(|error| CarrierError::structural(format!("DHL body is not XML: {error}"), body))
}

/// True when the document is a DHL `ErrorResponse` or carries request-level
/// conditions outside any waybill.
fn is_error_document(root: Node<'_, '_>) -> bool {
    root.tag_name().name() == "ErrorResponse"
        || xml::path(root, &["Response", "Status", "Condition"]).is_some()
}

/// Normalizes a `DCTResponse` into quotes, in the order DHL listed them.
///
/// Products without a `ShippingCharge` are skipped.
pub fn parse_quotes(body: &str) -> Result<Vec<Quote>, CarrierError> {
    let document = parse_document(body)?;
    let root = document.root_element();
    if is_error_document(root) {
        return Err(CarrierError::rejected(
            format!("DHL rejected quote request: {}", DhlConditionFormatter.format(body)),
            body,
        ));
    }

    let response = xml::child(root, "GetQuoteResponse")
        .ok_or_else(|| CarrierError::structural("DHL response lacks GetQuoteResponse", body))?;
    if xml::path(response, &["Note", "Condition"]).is_some() {
        return Err(CarrierError::rejected(
            format!("DHL rejected quote request: {}", DhlConditionFormatter.format(body)),
            body,
        ));
    }
    let details = xml::child(response, "BkgDetails")
        .ok_or_else(|| CarrierError::structural("DHL response lacks BkgDetails", body))?;

    let mut quotes = Vec::new();
    for line in xml::children(details, "QtdShp") {
        let Some(code) = text_at(line, &["GlobalProductCode"]) else {
            warn!("skipping DHL product without a product code");
            continue;
        };
        let Some(charge) = text_at(line, &["ShippingCharge"]) else {
            warn!(product = %code, "skipping DHL product without a shipping charge");
            continue;
        };
        let currency = text_or_empty(line, &["CurrencyCode"]);
        let price = Money::from_decimal_str(&charge, &currency).map_err(|error| {
            CarrierError::structural(format!("DHL product {code}: {error}"), body)
        })?;
        let name = text_at(line, &["ProductShortName"])
            .or_else(|| product_name(&code).map(str::to_owned))
            .unwrap_or_default();

        quotes.push(Quote::new(CarrierId::Dhl, code, price).with_service_name(name));
    }

    if quotes.is_empty() {
        return Err(CarrierError::structural(
            "DHL response contains no priced products",
            body,
        ));
    }
    Ok(quotes)
}

/// Normalizes a `TrackingResponse`, one result per `AWBInfo`.
///
/// A request-level `ErrorResponse` yields an error result for every
/// requested number.
pub fn parse_tracking(
    requested: &[String],
    body: &str,
    formatter: &dyn ErrorFormatter,
) -> Result<Vec<TrackingResult>, CarrierError> {
    let document = parse_document(body)?;
    let root = document.root_element();
    if is_error_document(root) {
        let message = formatter.format(body);
        return Ok(requested
            .iter()
            .map(|number| TrackingResult::error(number.trim(), body, message.as_str()))
            .collect());
    }

    let infos: Vec<_> = xml::children(root, "AWBInfo").collect();
    if root.tag_name().name() != "TrackingResponse" || infos.is_empty() {
        return Err(CarrierError::structural(
            "DHL response lacks TrackingResponse/AWBInfo",
            body,
        ));
    }

    infos
        .into_iter()
        .map(|info| normalize_awb(info, body, formatter))
        .collect()
}

fn normalize_awb(
    info: Node<'_, '_>,
    body: &str,
    formatter: &dyn ErrorFormatter,
) -> Result<TrackingResult, CarrierError> {
    let number = text_or_empty(info, &["AWBNumber"]);
    let status = text_or_empty(info, &["Status", "ActionStatus"]);
    if !status.eq_ignore_ascii_case(SUCCESS_STATUS) {
        let fragment = body.get(info.range()).unwrap_or(body);
        return Ok(TrackingResult::error(number, body, formatter.format(fragment)));
    }

    let shipment = xml::child(info, "ShipmentInfo").ok_or_else(|| {
        CarrierError::structural(format!("DHL waybill {number} lacks ShipmentInfo"), body)
    })?;

    let mut activities: Vec<TrackingActivity> = xml::children(shipment, "ShipmentEvent")
        .filter_map(normalize_event)
        .collect();
    activities.reverse();

    let code = text_or_empty(shipment, &["GlobalProductCode"]);
    let service = product_name(&code)
        .map(str::to_owned)
        .or_else(|| text_at(shipment, &["ShipmentDesc"]))
        .unwrap_or(code);

    let parcels = shipment_weight(shipment).into_iter().collect();
    let tracking = Tracking::new(CarrierId::Dhl, service, activities, None, parcels);
    Ok(TrackingResult::success(number, body, tracking))
}

fn normalize_event(event: Node<'_, '_>) -> Option<TrackingActivity> {
    let date = text_or_empty(event, &["Date"]);
    let time = text_or_empty(event, &["Time"]);
    let timestamp = match UtcDateTime::from_dashed(&date, &time) {
        Ok(timestamp) => timestamp,
        Err(error) => {
            warn!(%error, "dropping DHL event with unreadable timestamp");
            return None;
        }
    };

    let area = text_or_empty(event, &["ServiceArea", "Description"]);
    let (city, country) = split_composite(&area, " - ");

    Some(TrackingActivity {
        status: TrackingStatus::from_code(
            &text_or_empty(event, &["ServiceEvent", "EventCode"]),
            &EVENT_TABLE,
        ),
        description: text_or_empty(event, &["ServiceEvent", "Description"]),
        timestamp,
        address: Address::reported(city, "", "", country),
    })
}

fn shipment_weight(shipment: Node<'_, '_>) -> Option<Parcel> {
    let value = text_at(shipment, &["Weight"])?;
    let unit = WeightUnit::from_code(&text_or_empty(shipment, &["WeightUnit"]))
        .map_err(|error| warn!(%error, "ignoring DHL shipment weight"))
        .ok()?;
    let weight = Weight::parse(&value, unit)
        .map_err(|error| warn!(%error, "ignoring DHL shipment weight"))
        .ok()?;
    let length_unit = match unit {
        WeightUnit::Pound | WeightUnit::Ounce => LengthUnit::Inch,
        _ => LengthUnit::Centimeter,
    };
    Some(Parcel::weight_only(weight, length_unit))
}
