//! Pipeline/stage variable merging with default backfill.

use crate::core::keyed_list::{identity_of, merge_keyed_list, KeyedListOptions};
use crate::core::runtime_input::RuntimeInput;
use indexmap::IndexMap;
use serde_json::Value;

pub const VARIABLE_IDENTITY_FIELD: &str = "name";
pub const VARIABLE_VALUE_FIELD: &str = "value";
pub const VARIABLE_DEFAULT_FIELD: &str = "default";

/// Arguments for [`get_merged_variables`].
#[derive(Debug, Clone, Copy)]
pub struct MergeVariables<'a> {
    /// Variables declared by the current template.
    pub variables: &'a [Value],
    /// Variables saved in the input set (or a previous execution).
    pub input_set_variables: &'a [Value],
    /// Fully resolved variables; only their `default` fields are read.
    pub all_variables: &'a [Value],
    pub should_use_default_values: bool,
    pub identity_field: &'a str,
}

impl<'a> MergeVariables<'a> {
    pub fn new(variables: &'a [Value], input_set_variables: &'a [Value]) -> Self {
        Self {
            variables,
            input_set_variables,
            all_variables: &[],
            should_use_default_values: false,
            identity_field: VARIABLE_IDENTITY_FIELD,
        }
    }

    pub fn with_all_variables(mut self, all_variables: &'a [Value]) -> Self {
        self.all_variables = all_variables;
        self
    }

    pub fn with_default_values(mut self, enabled: bool) -> Self {
        self.should_use_default_values = enabled;
        self
    }

    pub fn with_identity_field(mut self, identity_field: &'a str) -> Self {
        self.identity_field = identity_field;
        self
    }
}

/// Merge template variables with input-set variables by name.
///
/// When defaults are enabled a merged variable that is still unresolved
/// (missing, empty, or a non-execution marker) takes the `default` declared
/// for the same name in `all_variables`, falling back to the marker's own
/// `.default(...)` payload.
pub fn get_merged_variables(args: MergeVariables<'_>) -> Vec<Value> {
    let options = KeyedListOptions::new(args.identity_field, VARIABLE_VALUE_FIELD);
    let merged = merge_keyed_list(args.variables, args.input_set_variables, options);
    if !args.should_use_default_values {
        return merged;
    }

    let mut defaults: IndexMap<String, &Value> = IndexMap::new();
    for record in args.all_variables {
        let default = record.get(VARIABLE_DEFAULT_FIELD).filter(|value| !value.is_null());
        if let (Some(identity), Some(default)) = (identity_of(record, args.identity_field), default) {
            defaults.entry(identity).or_insert(default);
        }
    }

    merged
        .into_iter()
        .map(|record| backfill_variable(record, &defaults, args.identity_field))
        .collect()
}

fn backfill_variable(record: Value, defaults: &IndexMap<String, &Value>, identity_field: &str) -> Value {
    let identity = identity_of(&record, identity_field);
    let Value::Object(mut map) = record else {
        return record;
    };
    let marker = map
        .get(VARIABLE_VALUE_FIELD)
        .and_then(Value::as_str)
        .and_then(RuntimeInput::parse);
    if marker.as_ref().is_some_and(RuntimeInput::is_execution_input) {
        return Value::Object(map);
    }
    let unresolved = marker.is_some()
        || match map.get(VARIABLE_VALUE_FIELD) {
            None | Some(Value::Null) => true,
            Some(Value::String(text)) => text.is_empty(),
            Some(_) => false,
        };
    if !unresolved {
        return Value::Object(map);
    }

    let replacement = identity
        .as_ref()
        .and_then(|identity| defaults.get(identity))
        .map(|default| (*default).clone())
        .or_else(|| {
            marker
                .as_ref()
                .and_then(RuntimeInput::default_value)
                .map(|payload| Value::String(payload.to_string()))
        });
    if let Some(value) = replacement {
        tracing::trace!(identity = ?identity, "backfilled variable default");
        map.insert(VARIABLE_VALUE_FIELD.to_string(), value);
    }
    Value::Object(map)
}
