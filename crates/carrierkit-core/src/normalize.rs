//! Shared response-normalization steps for JSON carrier bodies.

use serde_json::Value;

/// Reads a JSON value as a sequence.
///
/// Object-from-XML conversions collapse a one-element list into the bare
/// element, and some gateways serialize lists as objects keyed `"0".."n-1"`.
/// This is applied once, at the parsing boundary:
///
/// - array: its elements, in order
/// - object whose keys are exactly `"0".."n-1"`: its values in index order
/// - any other object or scalar: a one-element sequence
/// - null or absent: empty
pub fn coerce_to_sequence(value: Option<&Value>) -> Vec<&Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Object(map)) if !map.is_empty() && has_index_keys(map) => (0..map.len())
            .filter_map(|index| map.get(&index.to_string()))
            .collect(),
        Some(single) => vec![single],
    }
}

fn has_index_keys(map: &serde_json::Map<String, Value>) -> bool {
    let mut indices = Vec::with_capacity(map.len());
    for key in map.keys() {
        if key.is_empty() || !key.bytes().all(|byte| byte.is_ascii_digit()) {
            return false;
        }
        if key.len() > 1 && key.starts_with('0') {
            return false;
        }
        match key.parse::<usize>() {
            Ok(index) => indices.push(index),
            Err(_) => return false,
        }
    }
    indices.sort_unstable();
    indices.iter().enumerate().all(|(position, index)| position == *index)
}

/// Follows object keys from `value`; `None` as soon as one is missing.
pub fn json_path<'v>(value: &'v Value, path: &[&str]) -> Option<&'v Value> {
    path.iter().try_fold(value, |node, key| node.get(*key))
}

/// String at `path`; numbers are rendered so `"12.50"` and `12.5` both read.
pub fn json_str(value: &Value, path: &[&str]) -> Option<String> {
    match json_path(value, path)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// String at `path`, or an empty string.
pub fn json_str_or_empty(value: &Value, path: &[&str]) -> String {
    json_str(value, path).unwrap_or_default()
}

/// Splits a composite field such as `"LEIPZIG - GERMANY"` into two trimmed
/// parts. Missing parts come back empty.
pub fn split_composite<'s>(value: &'s str, separator: &str) -> (&'s str, &'s str) {
    match value.split_once(separator) {
        Some((first, second)) => (first.trim(), second.trim()),
        None => (value.trim(), ""),
    }
}
