//! Parsing of the `<+input>` runtime-input marker.
//!
//! A marker is any string that starts with [`RUNTIME_INPUT_VALUE`], optionally
//! followed by chained qualifiers such as `.default(x)`,
//! `.allowedValues(a,b)` or `.executionInput()`. Qualifier arguments may
//! contain nested parentheses and quoted spans, so they are read with a small
//! scanner instead of substring matching.

use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;

mod scanner;

use scanner::{split_top_level, QualifierScanner, RawQualifier};

/// The bare runtime-input token.
pub const RUNTIME_INPUT_VALUE: &str = "<+input>";

const DEFAULT_QUALIFIER: &str = "default";
const ALLOWED_VALUES_QUALIFIER: &str = "allowedValues";
const EXECUTION_INPUT_QUALIFIER: &str = "executionInput";

/// One `.name(args)` suffix of a marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Qualifier {
    Default { value: String },
    AllowedValues { values: Vec<String> },
    ExecutionInput,
    Other { name: String, args: String },
}

impl Qualifier {
    fn from_raw(raw: RawQualifier<'_>) -> Self {
        match raw.name {
            DEFAULT_QUALIFIER => Qualifier::Default {
                value: raw.args.to_string(),
            },
            ALLOWED_VALUES_QUALIFIER => Qualifier::AllowedValues {
                values: split_top_level(raw.args),
            },
            EXECUTION_INPUT_QUALIFIER => Qualifier::ExecutionInput,
            name => Qualifier::Other {
                name: name.to_string(),
                args: raw.args.to_string(),
            },
        }
    }
}

/// Strict parse failures. The reconciliation engine never surfaces these; it
/// skips the malformed qualifier and keeps the rest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkerError {
    #[error("value does not start with <+input>")]
    NotAMarker,
    #[error("expected `.name(` qualifier at byte {offset}")]
    ExpectedQualifier { offset: usize },
    #[error("unterminated qualifier arguments starting at byte {offset}")]
    UnterminatedArguments { offset: usize },
    #[error("unknown qualifier `{name}` at byte {offset}")]
    UnknownQualifier { name: String, offset: usize },
}

/// A parsed runtime-input marker. The original text is kept so that markers
/// which must survive (execution inputs) are written back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeInput {
    raw: String,
    qualifiers: Vec<Qualifier>,
}

impl RuntimeInput {
    /// Best-effort parse: a malformed qualifier is skipped up to the next
    /// top-level `.name(` and scanning resumes from there.
    pub fn parse(value: &str) -> Option<RuntimeInput> {
        let suffix = value.strip_prefix(RUNTIME_INPUT_VALUE)?;
        let mut scanner = QualifierScanner::new(suffix, RUNTIME_INPUT_VALUE.len());
        let mut qualifiers = Vec::new();
        loop {
            match scanner.next_qualifier() {
                Ok(Some(raw)) => qualifiers.push(Qualifier::from_raw(raw)),
                Ok(None) => break,
                Err(_) if scanner.recover() => {}
                Err(_) => break,
            }
        }
        Some(RuntimeInput {
            raw: value.to_string(),
            qualifiers,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn qualifiers(&self) -> &[Qualifier] {
        &self.qualifiers
    }

    /// Payload of the first `.default(...)` qualifier.
    pub fn default_value(&self) -> Option<&str> {
        self.qualifiers.iter().find_map(|qualifier| match qualifier {
            Qualifier::Default { value } => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn allowed_values(&self) -> Option<&[String]> {
        self.qualifiers.iter().find_map(|qualifier| match qualifier {
            Qualifier::AllowedValues { values } => Some(values.as_slice()),
            _ => None,
        })
    }

    pub fn is_execution_input(&self) -> bool {
        self.qualifiers
            .iter()
            .any(|qualifier| matches!(qualifier, Qualifier::ExecutionInput))
    }

    pub fn info(&self) -> MarkerInfo {
        MarkerInfo {
            has_default: self.default_value().is_some(),
            default_payload: self.default_value().map(str::to_string),
            has_allowed_values: self.allowed_values().is_some(),
            has_execution_input: self.is_execution_input(),
        }
    }
}

impl FromStr for RuntimeInput {
    type Err = MarkerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let suffix = value
            .strip_prefix(RUNTIME_INPUT_VALUE)
            .ok_or(MarkerError::NotAMarker)?;
        let mut scanner = QualifierScanner::new(suffix, RUNTIME_INPUT_VALUE.len());
        let mut qualifiers = Vec::new();
        loop {
            let offset = scanner.offset();
            match scanner.next_qualifier()? {
                Some(raw) => {
                    let qualifier = Qualifier::from_raw(raw);
                    if let Qualifier::Other { name, .. } = qualifier {
                        return Err(MarkerError::UnknownQualifier { name, offset });
                    }
                    qualifiers.push(qualifier);
                }
                None => break,
            }
        }
        Ok(RuntimeInput {
            raw: value.to_string(),
            qualifiers,
        })
    }
}

/// Flattened view of the qualifiers relevant to clearing and backfill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerInfo {
    pub has_default: bool,
    pub default_payload: Option<String>,
    pub has_allowed_values: bool,
    pub has_execution_input: bool,
}

pub fn is_runtime_input_str(value: &str) -> bool {
    value.starts_with(RUNTIME_INPUT_VALUE)
}

/// `true` when the tree value is a string carrying the `<+input>` token.
pub fn is_runtime_input(value: &Value) -> bool {
    value.as_str().is_some_and(is_runtime_input_str)
}

pub fn parse_marker(value: &Value) -> Option<MarkerInfo> {
    as_runtime_input(value).map(|marker| marker.info())
}

pub fn as_runtime_input(value: &Value) -> Option<RuntimeInput> {
    value.as_str().and_then(RuntimeInput::parse)
}

/// A marker still present somewhere in a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedInput {
    pub path: String,
    pub marker: RuntimeInput,
}

/// List every runtime-input leaf in document order, with dotted/indexed paths.
pub fn collect_runtime_inputs(tree: &Value) -> Vec<UnresolvedInput> {
    let mut found = Vec::new();
    collect_into(tree, "", &mut found);
    found
}

fn collect_into(value: &Value, path: &str, found: &mut Vec<UnresolvedInput>) {
    match value {
        Value::String(text) => {
            if let Some(marker) = RuntimeInput::parse(text) {
                found.push(UnresolvedInput {
                    path: path.to_string(),
                    marker,
                });
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                let location = format!("{}[{}]", path, index);
                collect_into(item, &location, found);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                let location = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                collect_into(item, &location, found);
            }
        }
        _ => {}
    }
}
