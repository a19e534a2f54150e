use crate::core::clear::{FieldRule, FieldRules, REMOVED_FIELDS, SINGLE_EMPTY_ITEM_FIELDS};
use crate::core::types::TreeFormat;
use crate::core::variables::VARIABLE_IDENTITY_FIELD;
use serde::{Deserialize, Serialize};

pub mod loader;

pub use loader::ConfigLoader;

/// Reconciler configuration loaded from reconciler.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ReconcilerConfig {
    /// Clear pass field rules
    #[serde(default)]
    pub clear: ClearConfig,

    /// Merge behaviour
    #[serde(default)]
    pub merge: MergeConfig,

    /// Output rendering
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClearConfig {
    /// Fields whose cleared marker becomes `[""]`
    #[serde(default = "default_array_fields")]
    pub array_fields: Vec<String>,

    /// Fields dropped when their value is a non-execution marker
    #[serde(default = "default_removed_fields")]
    pub removed_fields: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MergeConfig {
    #[serde(default)]
    pub use_default_values: bool,

    /// Field that identifies a variable record
    #[serde(default = "default_variable_identity_field")]
    pub variable_identity_field: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: TreeFormat,
}

impl Default for ClearConfig {
    fn default() -> Self {
        Self {
            array_fields: default_array_fields(),
            removed_fields: default_removed_fields(),
        }
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            use_default_values: false,
            variable_identity_field: default_variable_identity_field(),
        }
    }
}

impl ReconcilerConfig {
    /// Field rules for the clear pass. Array fields are applied before
    /// removed fields, so validation rejects names listed in both.
    pub fn field_rules(&self) -> FieldRules {
        let mut rules = FieldRules::empty();
        for field in &self.clear.array_fields {
            rules.insert(field, FieldRule::SingleEmptyItem);
        }
        for field in &self.clear.removed_fields {
            rules.insert(field, FieldRule::Remove);
        }
        rules
    }
}

fn default_array_fields() -> Vec<String> {
    SINGLE_EMPTY_ITEM_FIELDS.iter().map(|field| field.to_string()).collect()
}

fn default_removed_fields() -> Vec<String> {
    REMOVED_FIELDS.iter().map(|field| field.to_string()).collect()
}

fn default_variable_identity_field() -> String {
    VARIABLE_IDENTITY_FIELD.to_string()
}
