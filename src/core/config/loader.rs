#![allow(clippy::result_large_err)]

use super::ReconcilerConfig;
use crate::core::error::AppError;
use crate::core::types::{ErrorCategory, TreeFormat};
use std::env;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "reconciler.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from the working directory (dir/reconciler.toml)
    /// Environment variables override config file values
    /// A missing file yields defaults plus env vars
    pub fn load_from_workspace(workspace_path: &Path) -> Result<ReconcilerConfig, AppError> {
        let config_path = workspace_path.join(CONFIG_FILE_NAME);
        let config = Self::load_from_file(&config_path)?.unwrap_or_default();
        Self::finish(config)
    }

    /// Load config from an explicit path; the file must exist
    pub fn load_explicit(path: &Path) -> Result<ReconcilerConfig, AppError> {
        match Self::load_from_file(path)? {
            Some(config) => Self::finish(config),
            None => Err(AppError::new(
                ErrorCategory::IoError,
                format!("Config file {} does not exist", path.display()),
            )
            .with_code("RCN-IO-001")),
        }
    }

    /// Load config from specific file path
    /// Returns Ok(None) if file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<ReconcilerConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
            .with_code("RCN-IO-001")
        })?;

        let config: ReconcilerConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ConfigError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
            .with_code("RCN-CFG-001")
        })?;

        Ok(Some(config))
    }

    fn finish(mut config: ReconcilerConfig) -> Result<ReconcilerConfig, AppError> {
        Self::apply_env_overrides(&mut config);
        Self::validate_config(&config)?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    /// Unparseable values are ignored
    fn apply_env_overrides(config: &mut ReconcilerConfig) {
        if let Ok(use_defaults) = env::var("RECONCILER_USE_DEFAULT_VALUES") {
            if let Ok(use_defaults) = use_defaults.parse::<bool>() {
                config.merge.use_default_values = use_defaults;
            }
        }

        if let Ok(format) = env::var("RECONCILER_OUTPUT_FORMAT") {
            match format.parse::<TreeFormat>() {
                Ok(format) => config.output.format = format,
                Err(e) => tracing::warn!("ignoring RECONCILER_OUTPUT_FORMAT: {}", e),
            }
        }
    }

    /// Get documentation for supported environment variables
    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "RECONCILER_USE_DEFAULT_VALUES - Override merge.use_default_values (true/false)",
            "RECONCILER_OUTPUT_FORMAT - Override output.format (yaml/json)",
            "RECONCILER_LOG_DIR - Override the log directory",
        ]
    }

    /// Validate configuration values
    pub fn validate_config(config: &ReconcilerConfig) -> Result<(), AppError> {
        if config.merge.variable_identity_field.trim().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ConfigError,
                "Variable identity field cannot be empty".to_string(),
            )
            .with_code("RCN-CFG-002"));
        }

        if let Some(field) = config
            .clear
            .array_fields
            .iter()
            .find(|field| config.clear.removed_fields.contains(field))
        {
            return Err(AppError::new(
                ErrorCategory::ConfigError,
                format!("Field '{}' cannot be both an array field and a removed field", field),
            )
            .with_code("RCN-CFG-002")
            .with_suggestion("Remove the field from one of the [clear] lists"));
        }

        Ok(())
    }
}
