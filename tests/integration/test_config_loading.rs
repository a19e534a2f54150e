use pipeline_reconciler::core::clear::{clear_runtime_input_with, FieldRule};
use pipeline_reconciler::core::config::{ConfigLoader, ReconcilerConfig};
use pipeline_reconciler::core::types::TreeFormat;
use serde_json::json;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

fn clear_reconciler_env() {
    for v in &["RECONCILER_USE_DEFAULT_VALUES", "RECONCILER_OUTPUT_FORMAT"] {
        env::remove_var(v);
    }
}

/// Test integration of config loading with environment variables
#[test]
#[serial]
fn test_config_loading_integration() {
    clear_reconciler_env();
    let temp_dir = TempDir::new().unwrap();
    let workspace_path = temp_dir.path();

    let config_content = r#"
[clear]
array_fields = ["files", "tags"]
removed_fields = ["when"]

[merge]
use_default_values = true
variable_identity_field = "key"

[output]
format = "json"
"#;
    fs::write(workspace_path.join("reconciler.toml"), config_content).unwrap();

    let config = ConfigLoader::load_from_workspace(workspace_path).unwrap();
    assert_eq!(config.clear.array_fields, vec!["files", "tags"]);
    assert_eq!(config.clear.removed_fields, vec!["when"]);
    assert!(config.merge.use_default_values);
    assert_eq!(config.merge.variable_identity_field, "key");
    assert_eq!(config.output.format, TreeFormat::Json);

    let rules = config.field_rules();
    assert_eq!(rules.rule_for(Some("tags")), FieldRule::SingleEmptyItem);
    assert_eq!(rules.rule_for(Some("failureStrategies")), FieldRule::Clear);
}

#[test]
#[serial]
fn test_env_overrides_file_values() {
    clear_reconciler_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("reconciler.toml"),
        "[merge]\nuse_default_values = false\n\n[output]\nformat = \"yaml\"\n",
    )
    .unwrap();

    env::set_var("RECONCILER_USE_DEFAULT_VALUES", "true");
    env::set_var("RECONCILER_OUTPUT_FORMAT", "json");
    let config = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap();
    clear_reconciler_env();

    assert!(config.merge.use_default_values);
    assert_eq!(config.output.format, TreeFormat::Json);
}

#[test]
#[serial]
fn test_explicit_config_path() {
    clear_reconciler_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("custom.toml");
    fs::write(&path, "[clear]\narray_fields = []\n").unwrap();

    let config = ConfigLoader::load_explicit(&path).unwrap();
    let cleared = clear_runtime_input_with(&json!({ "files": "<+input>" }), &config.field_rules());
    assert_eq!(cleared, json!({ "files": "" }));
}

#[test]
#[serial]
fn test_invalid_config_is_rejected() {
    clear_reconciler_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("reconciler.toml"),
        "[merge]\nvariable_identity_field = \"  \"\n",
    )
    .unwrap();

    let err = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap_err();
    assert_eq!(err.code, "RCN-CFG-002");
}

#[test]
#[serial]
fn test_unknown_format_in_file_is_a_parse_error() {
    clear_reconciler_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("reconciler.toml"),
        "[output]\nformat = \"xml\"\n",
    )
    .unwrap();

    let err = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap_err();
    assert_eq!(err.code, "RCN-CFG-001");
}

#[test]
fn test_default_config_is_valid() {
    assert!(ConfigLoader::validate_config(&ReconcilerConfig::default()).is_ok());
}
