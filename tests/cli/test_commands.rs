use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const TEMPLATE: &str = "\
pipeline:
  identifier: ci
  variables:
    - name: env
      type: String
      value: <+input>.default(dev)
    - name: region
      type: String
      value: <+input>
  stages:
    - stage:
        identifier: build
        spec:
          files: <+input>
          when: <+input>
";

const INPUT_SET: &str = "\
inputSet:
  identifier: saved
  pipeline:
    identifier: ci
    variables:
      - name: region
        type: String
        value: eu-west-1
      - name: stale
        type: String
        value: old
";

fn write(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

fn reconciler(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("reconciler").unwrap();
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd.env_remove("RECONCILER_OUTPUT_FORMAT");
    cmd.env_remove("RECONCILER_USE_DEFAULT_VALUES");
    cmd.env_remove("RECONCILER_LOG_DIR");
    cmd
}

#[test]
fn test_help_lists_input_set_commands() {
    let temp = TempDir::new().unwrap();
    reconciler(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("INPUT SET COMMANDS"))
        .stdout(predicate::str::contains("merge"))
        .stdout(predicate::str::contains("unresolved"));
}

#[test]
fn test_version_flag() {
    let temp = TempDir::new().unwrap();
    reconciler(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_clear_command_outputs_blank_input_set() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "template.yaml", TEMPLATE);

    let output = reconciler(temp.path())
        .args(["clear", "template.yaml", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tree["pipeline"]["variables"][0]["value"], "dev");
    assert_eq!(tree["pipeline"]["variables"][1]["value"], "");
    assert_eq!(
        tree["pipeline"]["stages"][0]["stage"]["spec"],
        serde_json::json!({ "files": [""] })
    );
}

#[test]
fn test_merge_command_unwraps_input_set_and_appends_input_only_variables() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "template.yaml", TEMPLATE);
    write(temp.path(), "input.yaml", INPUT_SET);

    let output = reconciler(temp.path())
        .args([
            "merge",
            "--template",
            "template.yaml",
            "--input-set",
            "input.yaml",
            "--use-default-values",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let tree: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let variables = tree["pipeline"]["variables"].as_array().unwrap();
    assert_eq!(variables[0]["value"], "dev");
    assert_eq!(variables[1]["value"], "eu-west-1");
    assert_eq!(variables[2]["name"], "stale");
}

#[test]
fn test_merge_writes_output_file() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "template.yaml", TEMPLATE);
    write(temp.path(), "input.yaml", INPUT_SET);

    reconciler(temp.path())
        .args([
            "merge",
            "--template",
            "template.yaml",
            "--input-set",
            "input.yaml",
            "--output",
            "merged.yaml",
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let merged = fs::read_to_string(temp.path().join("merged.yaml")).unwrap();
    assert!(merged.contains("eu-west-1"));
    assert!(merged.contains("<+input>.default(dev)"));
}

#[test]
fn test_defaults_command() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "template.yaml", TEMPLATE);

    reconciler(temp.path())
        .args(["defaults", "template.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("value: dev"))
        .stdout(predicate::str::contains("when:"))
        .stdout(predicate::str::contains("<+input>"));
}

#[test]
fn test_variables_command_merges_sequences() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "vars.json",
        r#"[{"name":"a","value":"<+input>"},{"name":"b","value":"<+input>"}]"#,
    );
    write(temp.path(), "saved.json", r#"[{"name":"b","value":"2"}]"#);

    let output = reconciler(temp.path())
        .args([
            "variables",
            "--template",
            "vars.json",
            "--input-set",
            "saved.json",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let merged: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        merged,
        serde_json::json!([{ "name": "a", "value": "<+input>" }, { "name": "b", "value": "2" }])
    );
}

#[test]
fn test_variables_command_rejects_mapping() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "vars.yaml", "name: a\n");
    write(temp.path(), "saved.yaml", "[]\n");

    reconciler(temp.path())
        .args(["variables", "--template", "vars.yaml", "--input-set", "saved.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must hold a sequence of variables"));
}

#[test]
fn test_inspect_command_reports_qualifiers() {
    let temp = TempDir::new().unwrap();
    let output = reconciler(temp.path())
        .args(["inspect", "<+input>.default(a).allowedValues(a,b)"])
        .output()
        .unwrap();
    assert!(output.status.success());
    insta::assert_snapshot!(String::from_utf8_lossy(&output.stdout), @r#"
    {
      "raw": "<+input>.default(a).allowedValues(a,b)",
      "qualifiers": [
        {
          "kind": "default",
          "value": "a"
        },
        {
          "kind": "allowedValues",
          "values": [
            "a",
            "b"
          ]
        }
      ],
      "info": {
        "hasDefault": true,
        "defaultPayload": "a",
        "hasAllowedValues": true,
        "hasExecutionInput": false
      }
    }
    "#);
}

#[test]
fn test_inspect_command_surfaces_strict_errors() {
    let temp = TempDir::new().unwrap();
    reconciler(temp.path())
        .args(["inspect", "<+input>.default(a).regex(x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"strictError\""))
        .stdout(predicate::str::contains("\"defaultPayload\": \"a\""));
}

#[test]
fn test_inspect_rejects_plain_text() {
    let temp = TempDir::new().unwrap();
    reconciler(temp.path())
        .args(["inspect", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a runtime input"));
}

#[test]
fn test_unresolved_lists_paths() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "template.yaml", TEMPLATE);

    let output = reconciler(temp.path())
        .args(["unresolved", "template.yaml"])
        .output()
        .unwrap();
    assert!(output.status.success());
    insta::assert_snapshot!(String::from_utf8_lossy(&output.stdout), @r"
    pipeline.variables[0].value	<+input>.default(dev)
    pipeline.variables[1].value	<+input>
    pipeline.stages[0].stage.spec.files	<+input>
    pipeline.stages[0].stage.spec.when	<+input>
    ");
}

#[test]
fn test_missing_file_reports_error_code() {
    let temp = TempDir::new().unwrap();
    reconciler(temp.path())
        .args(["clear", "missing.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("RCN-IO-001"));
}

#[test]
fn test_config_file_sets_output_format() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "template.yaml", TEMPLATE);
    write(temp.path(), "reconciler.toml", "[output]\nformat = \"json\"\n");

    reconciler(temp.path())
        .args(["defaults", "template.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{"));
}

#[test]
fn test_invalid_config_fails_fast() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "template.yaml", TEMPLATE);
    write(
        temp.path(),
        "reconciler.toml",
        "[clear]\narray_fields = [\"when\"]\nremoved_fields = [\"when\"]\n",
    );

    reconciler(temp.path())
        .args(["clear", "template.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("RCN-CFG-002"));
}
