//! DHL XML-PI request documents.
//!
//! Templates are filled with escaped values; no element is ever built from
//! unescaped caller input.

use super::DhlConfig;
use crate::carrier::{CarrierError, QuoteRequest, TrackingOptions};
use crate::xml::escape;
use crate::{Address, LengthUnit, UnitSystem, UtcDateTime, WeightUnit};

/// Origin countries quoted in inches and pounds; everything else is metric.
pub const IMPERIAL_ORIGINS: [&str; 3] = ["US", "LR", "MM"];

const READY_TIME: &str = "PT10H00M";

pub fn unit_system(origin_country: &str) -> UnitSystem {
    UnitSystem::for_origin(
        origin_country,
        UnitSystem::Metric,
        UnitSystem::Imperial,
        &IMPERIAL_ORIGINS,
    )
}

fn dimension_code(unit: LengthUnit) -> &'static str {
    match unit {
        LengthUnit::Inch => "IN",
        _ => "CM",
    }
}

fn weight_code(unit: WeightUnit) -> &'static str {
    match unit {
        WeightUnit::Pound => "LB",
        _ => "KG",
    }
}

/// 32-digit reference derived from the message time.
fn message_reference(message_time: UtcDateTime) -> String {
    let nanos = message_time.into_inner().unix_timestamp_nanos().unsigned_abs();
    let digits = format!("{nanos:0>32}");
    digits[digits.len() - 32..].to_owned()
}

fn service_header(config: &DhlConfig, message_time: UtcDateTime) -> String {
    format!(
        "<ServiceHeader>\
<MessageTime>{time}</MessageTime>\
<MessageReference>{reference}</MessageReference>\
<SiteID>{site}</SiteID>\
<Password>{password}</Password>\
</ServiceHeader>",
        time = message_time.format_rfc3339(),
        reference = message_reference(message_time),
        site = escape(&config.site_id),
        password = escape(&config.password),
    )
}

fn location(tag: &str, address: &Address) -> String {
    format!(
        "<{tag}><CountryCode>{country}</CountryCode><Postalcode>{postal}</Postalcode><City>{city}</City></{tag}>",
        country = escape(&address.country),
        postal = escape(&address.postal_code),
        city = escape(&address.city),
    )
}

/// Builds a `DCTRequest/GetQuote` document.
///
/// Fails with an invalid request when a parcel cannot be expressed in the
/// origin's unit system.
pub fn quote_request(
    config: &DhlConfig,
    req: &QuoteRequest,
    message_time: UtcDateTime,
) -> Result<String, CarrierError> {
    let system = unit_system(&req.sender.country);
    let booking_date = message_time.into_inner().date();

    let pieces = req
        .parcels
        .iter()
        .enumerate()
        .map(|(index, parcel)| -> Result<String, CarrierError> {
            let converted = parcel.convert_to_system(system)?;
            Ok(format!(
                "<Piece><PieceID>{id}</PieceID><Height>{height}</Height><Depth>{depth}</Depth><Width>{width}</Width><Weight>{weight}</Weight></Piece>",
                id = index + 1,
                height = converted.height.to_wire(),
                depth = converted.length.to_wire(),
                width = converted.width.to_wire(),
                weight = converted.weight.to_wire(),
            ))
        })
        .collect::<Result<String, _>>()?;

    let account = config
        .account_number
        .as_deref()
        .map(|number| format!("<PaymentAccountNumber>{}</PaymentAccountNumber>", escape(number)))
        .unwrap_or_default();

    Ok(format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<p:DCTRequest xmlns:p="http://www.dhl.com" xmlns:p1="http://www.dhl.com/datatypes" xmlns:p2="http://www.dhl.com/DCTRequestdatatypes" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://www.dhl.com DCT-req.xsd">
<GetQuote>
<Request>{header}</Request>
{from}
<BkgDetails>
<PaymentCountryCode>{payment_country}</PaymentCountryCode>
<Date>{booking_date}</Date>
<ReadyTime>{READY_TIME}</ReadyTime>
<DimensionUnit>{dimension_unit}</DimensionUnit>
<WeightUnit>{weight_unit}</WeightUnit>
<Pieces>{pieces}</Pieces>
{account}
<IsDutiable>N</IsDutiable>
</BkgDetails>
{to}
</GetQuote>
</p:DCTRequest>"#,
        header = service_header(config, message_time),
        from = location("From", &req.sender),
        payment_country = escape(&req.sender.country),
        dimension_unit = dimension_code(system.length_unit()),
        weight_unit = weight_code(system.weight_unit()),
        to = location("To", &req.recipient),
    ))
}

/// Builds a `KnownTrackingRequest` for up to ten air waybills.
pub fn tracking_request(
    config: &DhlConfig,
    tracking_numbers: &[String],
    options: TrackingOptions,
    message_time: UtcDateTime,
) -> String {
    let awbs: String = tracking_numbers
        .iter()
        .map(|number| format!("<AWBNumber>{}</AWBNumber>", escape(number.trim())))
        .collect();
    let level = if options.all_activity {
        "ALL_CHECK_POINTS"
    } else {
        "LAST_CHECK_POINT_ONLY"
    };

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<req:KnownTrackingRequest xmlns:req="http://www.dhl.com" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://www.dhl.com TrackingRequestKnown.xsd">
<Request>{header}</Request>
<LanguageCode>en</LanguageCode>
{awbs}
<LevelOfDetails>{level}</LevelOfDetails>
<PiecesEnabled>S</PiecesEnabled>
</req:KnownTrackingRequest>"#,
        header = service_header(config, message_time),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml;
    use crate::{Length, Parcel, Weight};
    use roxmltree::Document;

    fn at() -> UtcDateTime {
        UtcDateTime::parse("2024-01-05T10:00:00Z").expect("timestamp")
    }

    fn config() -> DhlConfig {
        DhlConfig::new("site & co", "p<w>d")
    }

    fn request(origin: &str) -> QuoteRequest {
        let parcel = Parcel::new(
            Length::parse("30", LengthUnit::Centimeter).expect("valid"),
            Length::parse("20", LengthUnit::Centimeter).expect("valid"),
            Length::parse("10", LengthUnit::Centimeter).expect("valid"),
            Weight::parse("2", WeightUnit::Kilogram).expect("valid"),
        );
        let sender = Address::new(Vec::new(), "Leipzig", "", "04109", origin).expect("valid");
        let recipient = Address::new(Vec::new(), "Boston", "MA", "02101", "US").expect("valid");
        QuoteRequest::new(sender, recipient, vec![parcel]).expect("valid request")
    }

    #[test]
    fn quote_document_is_well_formed_and_escaped() {
        let body = quote_request(&config(), &request("DE"), at()).expect("builds");
        let document = Document::parse(&body).expect("well-formed xml");
        let root = document.root_element();

        assert_eq!(root.tag_name().name(), "DCTRequest");
        let header = xml::path(root, &["GetQuote", "Request", "ServiceHeader"]).expect("header");
        assert_eq!(xml::text_at(header, &["SiteID"]).as_deref(), Some("site & co"));
        assert_eq!(xml::text_at(header, &["Password"]).as_deref(), Some("p<w>d"));
        assert_eq!(
            xml::text_at(header, &["MessageReference"]).map(|reference| reference.len()),
            Some(32)
        );

        let details = xml::path(root, &["GetQuote", "BkgDetails"]).expect("details");
        assert_eq!(xml::text_at(details, &["Date"]).as_deref(), Some("2024-01-05"));
        assert_eq!(xml::text_at(details, &["DimensionUnit"]).as_deref(), Some("CM"));
        assert_eq!(xml::text_at(details, &["WeightUnit"]).as_deref(), Some("KG"));
        assert_eq!(
            xml::text_at(details, &["Pieces", "Piece", "Depth"]).as_deref(),
            Some("30.00")
        );
        assert_eq!(
            xml::text_at(root, &["GetQuote", "To", "CountryCode"]).as_deref(),
            Some("US")
        );
    }

    #[test]
    fn imperial_origins_convert_pieces() {
        let body = quote_request(&config(), &request("LR"), at()).expect("builds");
        let document = Document::parse(&body).expect("well-formed xml");
        let details =
            xml::path(document.root_element(), &["GetQuote", "BkgDetails"]).expect("details");

        assert_eq!(xml::text_at(details, &["DimensionUnit"]).as_deref(), Some("IN"));
        assert_eq!(xml::text_at(details, &["WeightUnit"]).as_deref(), Some("LB"));
        assert_eq!(
            xml::text_at(details, &["Pieces", "Piece", "Depth"]).as_deref(),
            Some("11.81")
        );
        assert_eq!(
            xml::text_at(details, &["Pieces", "Piece", "Weight"]).as_deref(),
            Some("4.41")
        );
    }

    #[test]
    fn oversized_piece_is_an_invalid_request() {
        let mut req = request("US");
        req.parcels[0].weight =
            Weight::parse("79228162514264337593543950335", WeightUnit::Kilogram).expect("valid");

        let error = quote_request(&config(), &req, at()).expect_err("cannot convert");
        assert_eq!(error.kind(), crate::CarrierErrorKind::InvalidRequest);
        assert!(error.message().contains("weight"));
    }

    #[test]
    fn account_number_is_optional() {
        let without = quote_request(&config(), &request("DE"), at()).expect("builds");
        assert!(!without.contains("PaymentAccountNumber"));

        let with = quote_request(
            &config().with_account_number("123456789"),
            &request("DE"),
            at(),
        )
        .expect("builds");
        assert!(with.contains("<PaymentAccountNumber>123456789</PaymentAccountNumber>"));
    }

    #[test]
    fn tracking_document_lists_every_waybill() {
        let numbers = vec![String::from("1234567890"), String::from(" 0987654321 ")];
        let body = tracking_request(
            &config(),
            &numbers,
            TrackingOptions {
                all_activity: false,
            },
            at(),
        );
        let document = Document::parse(&body).expect("well-formed xml");
        let root = document.root_element();

        let awbs: Vec<_> = xml::children(root, "AWBNumber")
            .filter_map(|node| node.text())
            .collect();
        assert_eq!(awbs, vec!["1234567890", "0987654321"]);
        assert_eq!(
            xml::text_at(root, &["LevelOfDetails"]).as_deref(),
            Some("LAST_CHECK_POINT_ONLY")
        );
    }
}
