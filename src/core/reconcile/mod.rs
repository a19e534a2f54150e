//! Reconciliation of a saved input set against the current pipeline template.
//!
//! The template is authoritative for structure: only fields the template
//! declares survive, structural lists are matched by identity, and values
//! are taken from the input set wherever the template leaves a runtime input.

use crate::core::runtime_input::{is_runtime_input, RuntimeInput};
use crate::core::variables::{get_merged_variables, MergeVariables, VARIABLE_IDENTITY_FIELD};
use serde_json::{Map, Value};

mod regions;

pub use regions::Region;
use regions::{element_key, parallel_group, ElementIndex, PARALLEL_KEY};

/// Root key holding the pipeline under reconciliation.
pub const PIPELINE_KEY: &str = "pipeline";

/// Arguments for [`merge_template_with_input_set_data`].
#[derive(Debug, Clone, Copy)]
pub struct MergeInputs<'a> {
    /// `{pipeline: …}` rendered from the current template.
    pub template_pipeline: &'a Value,
    /// `{pipeline: …}` from the saved input set.
    pub input_set_portion: &'a Value,
    /// `{pipeline: …}` with every field resolved; consulted for defaults.
    pub all_values: &'a Value,
    pub should_use_default_values: bool,
}

/// Merge an input set into the template using the default variable identity.
pub fn merge_template_with_input_set_data(inputs: MergeInputs<'_>) -> Value {
    Reconciler::default().merge(inputs)
}

/// Reconciliation settings that outlive a single merge.
#[derive(Debug, Clone)]
pub struct Reconciler {
    variable_identity_field: String,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self {
            variable_identity_field: VARIABLE_IDENTITY_FIELD.to_string(),
        }
    }
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable_identity_field(mut self, field: impl Into<String>) -> Self {
        self.variable_identity_field = field.into();
        self
    }

    pub fn merge(&self, inputs: MergeInputs<'_>) -> Value {
        let Some(template_root) = inputs.template_pipeline.as_object() else {
            tracing::debug!("template root is not a mapping; returning it unchanged");
            return inputs.template_pipeline.clone();
        };
        let pass = Pass {
            use_defaults: inputs.should_use_default_values,
            identity_field: &self.variable_identity_field,
        };

        let mut merged = Map::new();
        for (key, template) in template_root {
            let value = if key == PIPELINE_KEY {
                pass.merge_node(
                    Some(key.as_str()),
                    template,
                    present(inputs.input_set_portion.get(PIPELINE_KEY)),
                    inputs.all_values.get(PIPELINE_KEY),
                )
            } else {
                template.clone()
            };
            merged.insert(key.clone(), value);
        }
        tracing::debug!(
            use_defaults = inputs.should_use_default_values,
            "reconciled input set against template"
        );
        Value::Object(merged)
    }
}

/// Null input is treated as absent.
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|value| !value.is_null())
}

struct Pass<'a> {
    use_defaults: bool,
    identity_field: &'a str,
}

impl Pass<'_> {
    fn merge_node(
        &self,
        key: Option<&str>,
        template: &Value,
        input: Option<&Value>,
        all: Option<&Value>,
    ) -> Value {
        match template {
            Value::String(text) => match RuntimeInput::parse(text) {
                Some(marker) => self.merge_marker(template, &marker, input),
                None => template.clone(),
            },
            Value::Object(map) => Value::Object(self.merge_mapping(
                map,
                input.and_then(Value::as_object),
                all.and_then(Value::as_object),
            )),
            Value::Array(items) => self.merge_array(
                key,
                items,
                input.and_then(Value::as_array).map(Vec::as_slice),
                all.and_then(Value::as_array).map(Vec::as_slice),
            ),
            _ => template.clone(),
        }
    }

    fn merge_marker(&self, template: &Value, marker: &RuntimeInput, input: Option<&Value>) -> Value {
        match input {
            Some(value) if !is_runtime_input(value) => value.clone(),
            _ => self.backfill(template, marker),
        }
    }

    fn backfill(&self, template: &Value, marker: &RuntimeInput) -> Value {
        if !self.use_defaults || marker.is_execution_input() {
            return template.clone();
        }
        match marker.default_value() {
            Some(payload) => Value::String(payload.to_string()),
            None => template.clone(),
        }
    }

    fn merge_mapping(
        &self,
        template: &Map<String, Value>,
        input: Option<&Map<String, Value>>,
        all: Option<&Map<String, Value>>,
    ) -> Map<String, Value> {
        let mut merged = Map::new();
        for (key, value) in template {
            let input_value = present(input.and_then(|map| map.get(key)));
            let all_value = all.and_then(|map| map.get(key));
            merged.insert(
                key.clone(),
                self.merge_node(Some(key.as_str()), value, input_value, all_value),
            );
        }
        if let Some(input) = input {
            let dropped = input.keys().filter(|key| !template.contains_key(*key)).count();
            if dropped > 0 {
                tracing::trace!(dropped, "dropped input fields the template does not declare");
            }
        }
        merged
    }

    fn merge_array(
        &self,
        key: Option<&str>,
        template: &[Value],
        input: Option<&[Value]>,
        all: Option<&[Value]>,
    ) -> Value {
        let region = Region::for_field(key);
        if region == Some(Region::Variables) && is_record_list(template) && input.map_or(true, is_record_list) {
            let merged = get_merged_variables(
                MergeVariables::new(template, input.unwrap_or(&[]))
                    .with_all_variables(all.unwrap_or(&[]))
                    .with_default_values(self.use_defaults)
                    .with_identity_field(self.identity_field),
            );
            return Value::Array(merged);
        }

        let kinds = region.and_then(Region::element_kinds);
        let input_index = ElementIndex::build(input, kinds);
        let all_index = ElementIndex::build(all, kinds);
        if let Some(region) = region {
            tracing::debug!(
                ?region,
                template = template.len(),
                matched_input = input_index.len(),
                "merging structural list"
            );
        }

        let lists = Lists {
            input,
            all,
            input_index: &input_index,
            all_index: &all_index,
            kinds,
        };
        Value::Array(
            template
                .iter()
                .enumerate()
                .map(|(position, element)| self.merge_element(element, position, &lists))
                .collect(),
        )
    }

    fn merge_element(&self, element: &Value, position: usize, lists: &Lists<'_, '_>) -> Value {
        if let Some(group) = parallel_group(element) {
            let merged_group: Vec<Value> = group
                .iter()
                .map(|inner| match element_key(inner, lists.kinds) {
                    Some(key) => self.merge_node(
                        None,
                        inner,
                        lists.input_index.get(&key),
                        lists.all_index.get(&key),
                    ),
                    None => self.merge_node(None, inner, None, None),
                })
                .collect();
            let mut wrapper = element.as_object().cloned().unwrap_or_default();
            wrapper.insert(PARALLEL_KEY.to_string(), Value::Array(merged_group));
            return Value::Object(wrapper);
        }

        match element_key(element, lists.kinds) {
            Some(key) => self.merge_node(
                None,
                element,
                lists.input_index.get(&key),
                lists.all_index.get(&key),
            ),
            None => self.merge_node(
                None,
                element,
                present(lists.input.and_then(|items| items.get(position))),
                lists.all.and_then(|items| items.get(position)),
            ),
        }
    }
}

struct Lists<'v, 'i> {
    input: Option<&'v [Value]>,
    all: Option<&'v [Value]>,
    input_index: &'i ElementIndex<'v>,
    all_index: &'i ElementIndex<'v>,
    kinds: Option<&'static [&'static str]>,
}

fn is_record_list(items: &[Value]) -> bool {
    items.iter().all(Value::is_object)
}
