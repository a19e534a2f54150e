//! Clearing of runtime-input leaves.
//!
//! Used to build an empty input-set skeleton from a template: every
//! `<+input>` leaf becomes a blank (or its declared default) so forms start
//! out editable. Execution inputs are left in place because they are resolved
//! when the pipeline runs, not when the input set is saved.

use crate::core::runtime_input::{as_runtime_input, RuntimeInput};
use indexmap::IndexMap;
use serde_json::{Map, Value};

mod rules;

pub use rules::{FieldRule, FieldRules, REMOVED_FIELDS, SINGLE_EMPTY_ITEM_FIELDS};

const VALUE_FIELD: &str = "value";
const DEFAULT_FIELD: &str = "default";

/// Clear every runtime input in `tree` using the built-in field rules.
pub fn clear_runtime_input(tree: &Value) -> Value {
    clear_runtime_input_with(tree, &FieldRules::default())
}

pub fn clear_runtime_input_with(tree: &Value, rules: &FieldRules) -> Value {
    match clear_field(None, tree, None, rules) {
        Cleared::Value(value) => value,
        Cleared::Removed => Value::String(String::new()),
    }
}

/// Replace only markers that carry a `.default(...)` payload. Other markers,
/// including execution inputs, are returned unchanged.
pub fn replace_default_values(tree: &Value) -> Value {
    match tree {
        Value::String(text) => match RuntimeInput::parse(text) {
            Some(marker) if !marker.is_execution_input() => marker
                .default_value()
                .map(|payload| Value::String(payload.to_string()))
                .unwrap_or_else(|| tree.clone()),
            _ => tree.clone(),
        },
        Value::Array(items) => Value::Array(items.iter().map(replace_default_values).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), replace_default_values(value)))
                .collect(),
        ),
        _ => tree.clone(),
    }
}

/// Count of leaves touched by a clear pass, grouped by outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearSummary {
    pub outcomes: IndexMap<String, usize>,
}

impl ClearSummary {
    /// Tally what a clear pass would do to each marker in `tree`.
    pub fn of(tree: &Value, rules: &FieldRules) -> Self {
        let mut summary = ClearSummary::default();
        tally(None, tree, &mut summary, rules);
        summary
    }

    fn bump(&mut self, outcome: &str) {
        *self.outcomes.entry(outcome.to_string()).or_insert(0) += 1;
    }
}

fn tally(key: Option<&str>, value: &Value, summary: &mut ClearSummary, rules: &FieldRules) {
    match value {
        Value::String(text) => {
            if let Some(marker) = RuntimeInput::parse(text) {
                let outcome = if marker.is_execution_input() {
                    "kept"
                } else if rules.rule_for(key) == FieldRule::Remove {
                    "removed"
                } else if marker.default_value().is_some() {
                    "defaulted"
                } else {
                    "cleared"
                };
                summary.bump(outcome);
            }
        }
        Value::Array(items) => items
            .iter()
            .for_each(|item| tally(None, item, summary, rules)),
        Value::Object(map) => map
            .iter()
            .for_each(|(field, item)| tally(Some(field.as_str()), item, summary, rules)),
        _ => {}
    }
}

enum Cleared {
    Value(Value),
    Removed,
}

fn clear_field(
    key: Option<&str>,
    value: &Value,
    sibling_default: Option<&Value>,
    rules: &FieldRules,
) -> Cleared {
    match value {
        Value::String(text) => match RuntimeInput::parse(text) {
            Some(marker) => clear_marker(key, value, &marker, sibling_default, rules),
            None => Cleared::Value(value.clone()),
        },
        Value::Array(items) => Cleared::Value(Value::Array(
            items
                .iter()
                .map(|item| clear_runtime_input_with(item, rules))
                .collect(),
        )),
        Value::Object(map) => Cleared::Value(Value::Object(clear_mapping(map, rules))),
        _ => Cleared::Value(value.clone()),
    }
}

fn clear_marker(
    key: Option<&str>,
    original: &Value,
    marker: &RuntimeInput,
    sibling_default: Option<&Value>,
    rules: &FieldRules,
) -> Cleared {
    if marker.is_execution_input() {
        return Cleared::Value(original.clone());
    }
    let rule = rules.rule_for(key);
    if rule == FieldRule::Remove {
        return Cleared::Removed;
    }
    if let Some(payload) = marker.default_value() {
        let payload = Value::String(payload.to_string());
        // A payload that is itself a marker is cleared by the same rules.
        return match as_runtime_input(&payload) {
            Some(inner) => clear_marker(key, &payload, &inner, sibling_default, rules),
            None => Cleared::Value(payload),
        };
    }
    if let Some(fallback) = sibling_default {
        return Cleared::Value(fallback.clone());
    }
    match rule {
        FieldRule::SingleEmptyItem => {
            Cleared::Value(Value::Array(vec![Value::String(String::new())]))
        }
        FieldRule::Clear | FieldRule::Remove => Cleared::Value(Value::String(String::new())),
    }
}

fn clear_mapping(map: &Map<String, Value>, rules: &FieldRules) -> Map<String, Value> {
    let sibling_default = map.get(DEFAULT_FIELD).filter(|value| is_concrete_scalar(value));
    let mut cleared = Map::new();
    for (key, value) in map {
        let fallback = if key == VALUE_FIELD {
            sibling_default
        } else {
            None
        };
        match clear_field(Some(key.as_str()), value, fallback, rules) {
            Cleared::Value(value) => {
                cleared.insert(key.clone(), value);
            }
            Cleared::Removed => {
                tracing::trace!(field = %key, "removed runtime input field");
            }
        }
    }
    cleared
}

fn is_concrete_scalar(value: &Value) -> bool {
    match value {
        Value::String(text) => RuntimeInput::parse(text).is_none(),
        Value::Number(_) | Value::Bool(_) => true,
        _ => false,
    }
}
