//! Keys — dotted-path access into an entry's details JSON.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::parser::LogEntry;

/// Parse `details` as a JSON object. Anything else is `None`.
pub fn parse_details(details: &str) -> Option<Map<String, Value>> {
    if details.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(details) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Dotted paths of every leaf. Nested objects recurse; arrays are leaves.
pub fn flatten_keys(map: &Map<String, Value>) -> Vec<String> {
    let mut keys = Vec::new();
    collect_keys(map, "", &mut keys);
    keys
}

fn collect_keys(map: &Map<String, Value>, prefix: &str, out: &mut Vec<String>) {
    for (key, value) in map {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::Object(nested) => collect_keys(nested, &full, out),
            _ => out.push(full),
        }
    }
}

/// Walk a dotted `path` through nested objects.
pub fn nested_value<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = map.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// String form of the value at `path`, used as a grouping key.
///
/// Strings are taken as-is and other values use their JSON text. A missing
/// key, or an empty string, yields `None`.
pub fn details_value(details: &str, path: &str) -> Option<String> {
    let map = parse_details(details)?;
    let text = match nested_value(&map, path)? {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

/// Sorted union of detail keys across `entries`.
pub fn all_keys<'a, I>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    entries
        .into_iter()
        .filter_map(|e| parse_details(&e.details_json))
        .flat_map(|map| flatten_keys(&map))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
