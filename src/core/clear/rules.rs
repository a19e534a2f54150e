use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// List-valued fields: a cleared marker becomes one empty row, not an empty list.
pub const SINGLE_EMPTY_ITEM_FIELDS: &[&str] = &["files", "encryptedFiles", "hostAttributes"];

/// Execution-only fields that are dropped instead of cleared.
pub const REMOVED_FIELDS: &[&str] = &["when", "failureStrategies"];

/// What a clear pass does with a runtime-input marker found under a field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FieldRule {
    /// Replace with an empty string.
    #[default]
    Clear,
    /// Replace with `[""]`.
    SingleEmptyItem,
    /// Delete the field from its parent mapping.
    Remove,
}

/// Field-name table consulted by the clearer. Fields not listed use
/// [`FieldRule::Clear`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRules {
    rules: IndexMap<String, FieldRule>,
}

impl Default for FieldRules {
    fn default() -> Self {
        let mut rules = FieldRules::empty();
        for field in SINGLE_EMPTY_ITEM_FIELDS {
            rules.insert(field, FieldRule::SingleEmptyItem);
        }
        for field in REMOVED_FIELDS {
            rules.insert(field, FieldRule::Remove);
        }
        rules
    }
}

impl FieldRules {
    pub fn empty() -> Self {
        Self {
            rules: IndexMap::new(),
        }
    }

    pub fn with_rule(mut self, field: &str, rule: FieldRule) -> Self {
        self.insert(field, rule);
        self
    }

    pub fn insert(&mut self, field: &str, rule: FieldRule) {
        self.rules.insert(field.to_string(), rule);
    }

    pub fn rule_for(&self, field: Option<&str>) -> FieldRule {
        field
            .and_then(|name| self.rules.get(name))
            .copied()
            .unwrap_or_default()
    }
}
