use serde::{Deserialize, Serialize};
use std::path::Path;

/// Error category enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    ValidationError,
    SerializationError,
    IoError,
    ConfigError,
    InternalError,
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Error severity enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Error,
    Warning,
    Info,
    Debug,
}

/// Text format used to read and write pipeline trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TreeFormat {
    #[default]
    Yaml,
    Json,
}

impl TreeFormat {
    /// Pick a format from a file extension; anything that is not `.json` is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => TreeFormat::Json,
            _ => TreeFormat::Yaml,
        }
    }
}

impl std::fmt::Display for TreeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeFormat::Yaml => write!(f, "yaml"),
            TreeFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for TreeFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "yaml" | "yml" => Ok(TreeFormat::Yaml),
            "json" => Ok(TreeFormat::Json),
            _ => Err(format!(
                "invalid output format '{}'; supported values are yaml, json",
                value
            )),
        }
    }
}
