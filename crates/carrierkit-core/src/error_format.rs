//! Strategies turning a failed carrier body into a caller-facing message.
//!
//! Used on the tracking-failure path only; the raw body is kept separately
//! on the [`TrackingResult`](crate::TrackingResult).

use serde_json::Value;

use crate::normalize::{coerce_to_sequence, json_path, json_str};
use crate::xml;

pub trait ErrorFormatter: Send + Sync {
    fn format(&self, raw_body: &str) -> String;
}

/// Default strategy: the raw body, unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawBodyFormatter;

impl ErrorFormatter for RawBodyFormatter {
    fn format(&self, raw_body: &str) -> String {
        raw_body.to_owned()
    }
}

/// Extracts the first error description from a UPS JSON error body.
///
/// Understands both the `Fault.detail.Errors.ErrorDetail` shape and the
/// `response.errors[]` shape; anything else falls back to the raw body.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpsFaultFormatter;

impl ErrorFormatter for UpsFaultFormatter {
    fn format(&self, raw_body: &str) -> String {
        let Ok(body) = serde_json::from_str::<Value>(raw_body) else {
            return raw_body.to_owned();
        };

        let fault_detail = json_path(&body, &["Fault", "detail", "Errors", "ErrorDetail"]);
        let from_fault = coerce_to_sequence(fault_detail).into_iter().find_map(|detail| {
            let description = json_str(detail, &["PrimaryErrorCode", "Description"])?;
            Some(match json_str(detail, &["PrimaryErrorCode", "Code"]) {
                Some(code) => format!("{description} ({code})"),
                None => description,
            })
        });

        let from_errors = || {
            coerce_to_sequence(json_path(&body, &["response", "errors"]))
                .into_iter()
                .find_map(|error| {
                    let message = json_str(error, &["message"])?;
                    Some(match json_str(error, &["code"]) {
                        Some(code) => format!("{message} ({code})"),
                        None => message,
                    })
                })
        };

        from_fault
            .or_else(from_errors)
            .unwrap_or_else(|| raw_body.to_owned())
    }
}

/// Joins the `ConditionData` texts of a DHL XML error body.
#[derive(Debug, Clone, Copy, Default)]
pub struct DhlConditionFormatter;

impl ErrorFormatter for DhlConditionFormatter {
    fn format(&self, raw_body: &str) -> String {
        let Ok(document) = roxmltree::Document::parse(raw_body) else {
            return raw_body.to_owned();
        };

        let messages: Vec<String> = document
            .descendants()
            .filter(|node| node.is_element() && node.tag_name().name() == "Condition")
            .filter_map(|condition| {
                let data = xml::text_at(condition, &["ConditionData"])?;
                Some(match xml::text_at(condition, &["ConditionCode"]) {
                    Some(code) => format!("{data} ({code})"),
                    None => data,
                })
            })
            .collect();

        if messages.is_empty() {
            raw_body.to_owned()
        } else {
            messages.join("; ")
        }
    }
}
