//! Identity-keyed merge of two ordered record lists.

use crate::core::runtime_input::as_runtime_input;
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

/// Which fields identify a record and carry its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyedListOptions<'a> {
    pub identity_field: &'a str,
    pub value_field: &'a str,
}

impl Default for KeyedListOptions<'_> {
    fn default() -> Self {
        Self {
            identity_field: "name",
            value_field: "value",
        }
    }
}

impl<'a> KeyedListOptions<'a> {
    pub fn new(identity_field: &'a str, value_field: &'a str) -> Self {
        Self {
            identity_field,
            value_field,
        }
    }
}

/// Identity of a record: a string or number under `field`.
pub fn identity_of(record: &Value, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Merge `input` into `template` by identity.
///
/// Output holds the template records in template order, each carrying the
/// matching input record's value, followed by input records whose identity
/// the template does not declare. The first occurrence of a duplicated
/// identity wins on both sides.
pub fn merge_keyed_list(
    template: &[Value],
    input: &[Value],
    options: KeyedListOptions<'_>,
) -> Vec<Value> {
    let mut by_identity: IndexMap<String, &Value> = IndexMap::new();
    for record in input {
        if let Some(identity) = identity_of(record, options.identity_field) {
            by_identity.entry(identity).or_insert(record);
        }
    }

    let mut seen: IndexSet<String> = IndexSet::new();
    let mut merged = Vec::with_capacity(template.len() + input.len());
    for record in template {
        match identity_of(record, options.identity_field) {
            Some(identity) => {
                if !seen.insert(identity.clone()) {
                    tracing::debug!(%identity, "dropping duplicate template record");
                    continue;
                }
                match by_identity.get(&identity) {
                    Some(overlay) => merged.push(overlay_value(record, overlay, options.value_field)),
                    None => merged.push(record.clone()),
                }
            }
            None => merged.push(record.clone()),
        }
    }

    for record in input {
        match identity_of(record, options.identity_field) {
            Some(identity) => {
                if seen.insert(identity.clone()) {
                    tracing::trace!(%identity, "appending record declared only by input");
                    merged.push(record.clone());
                }
            }
            None => merged.push(record.clone()),
        }
    }
    merged
}

/// Template record with the overlay's value field. Everything else, including
/// `type`, comes from the template. An overlay value that is still an
/// unresolved (non-execution) runtime input leaves the template value alone.
pub(crate) fn overlay_value(template: &Value, overlay: &Value, value_field: &str) -> Value {
    let value = overlay.get(value_field).filter(|value| !is_unresolved_marker(value));
    match (template, value) {
        (Value::Object(map), Some(value)) => {
            let mut record = map.clone();
            record.insert(value_field.to_string(), value.clone());
            Value::Object(record)
        }
        _ => template.clone(),
    }
}

fn is_unresolved_marker(value: &Value) -> bool {
    as_runtime_input(value).is_some_and(|marker| !marker.is_execution_input())
}
