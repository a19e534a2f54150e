use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TEMPLATE: &str = "pipeline:\n  identifier: p\n  stages:\n    - stage:\n        identifier: s\n        spec:\n          timeout: <+input>\n";
const INPUT_SET: &str = "pipeline:\n  stages:\n    - stage:\n        identifier: s\n        spec:\n          timeout: 10m\n";

fn workspace_path(temp_dir: &TempDir, logging_toml: &str) -> PathBuf {
    let workspace = temp_dir.path().to_path_buf();
    fs::create_dir_all(workspace.join(".reconciler")).expect("failed to create .reconciler directory");
    fs::write(workspace.join(".reconciler/logging.toml"), logging_toml)
        .expect("failed to write logging config");
    fs::write(workspace.join("template.yaml"), TEMPLATE).expect("failed to write template");
    fs::write(workspace.join("input.yaml"), INPUT_SET).expect("failed to write input set");
    workspace
}

fn log_file_path(workspace: &Path) -> PathBuf {
    workspace.join(".reconciler/logs/reconciler.log")
}

fn merge_command(workspace: &Path) -> Command {
    let mut cmd = Command::cargo_bin("reconciler").expect("failed to locate binary");
    cmd.current_dir(workspace)
        .env_remove("RUST_LOG")
        .env_remove("RECONCILER_LOG_DIR")
        .args(["merge", "--template", "template.yaml", "--input-set", "input.yaml"]);
    cmd
}

#[test]
fn file_sink_receives_engine_events_without_console() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let workspace = workspace_path(
        &temp_dir,
        "[logging]\ndefault_level = \"debug\"\nenable_file = true\nconsole_output = \"none\"\n",
    );

    merge_command(&workspace)
        .assert()
        .success()
        .stderr(predicate::str::is_empty())
        .stdout(predicate::str::contains("timeout: 10m"));

    let contents = fs::read_to_string(log_file_path(&workspace)).expect("failed to read log file");
    assert!(contents.contains("logging initialized"));
    assert!(contents.contains("merging structural list"));
    assert!(contents.contains("reconciled input set against template"));
}

#[test]
fn console_sink_writes_to_stderr_only() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let workspace = workspace_path(
        &temp_dir,
        "[logging]\ndefault_level = \"info\"\nconsole_output = \"stdout\"\n",
    );

    let output = merge_command(&workspace).output().expect("failed to run merge");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stdout.contains("merged input set"));
    assert!(stderr.contains("merged input set"));
    assert!(!log_file_path(&workspace).exists());
}

#[test]
fn env_log_dir_enables_file_sink() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let workspace = workspace_path(&temp_dir, "[logging]\ndefault_level = \"info\"\n");
    let log_dir = temp_dir.path().join("custom-logs");

    merge_command(&workspace)
        .env("RECONCILER_LOG_DIR", &log_dir)
        .assert()
        .success();

    let contents =
        fs::read_to_string(log_dir.join("reconciler.log")).expect("failed to read log file");
    assert!(contents.contains("merged input set"));
}

#[test]
fn invalid_logging_config_does_not_block_command() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let workspace = workspace_path(&temp_dir, "[logging]\ndefault_level = \"reconciler=loud\"\n");

    merge_command(&workspace)
        .assert()
        .success()
        .stderr(predicate::str::contains("logging disabled"))
        .stdout(predicate::str::contains("timeout: 10m"));
}
