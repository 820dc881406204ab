//! Integration tests for the `anneal validate` command.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write_config(root: &std::path::Path) {
    std::fs::create_dir_all(root.join("configs")).unwrap();
    std::fs::write(root.join("configs/pipeline.yaml"), "classes:\n  - ball\n  - robot\n")
        .unwrap();
}

fn write_pair(root: &std::path::Path, stem: &str, label: &str) {
    let export = root.join("annotations/yolo_export");
    std::fs::create_dir_all(export.join("images")).unwrap();
    std::fs::create_dir_all(export.join("labels")).unwrap();
    std::fs::write(export.join("images").join(format!("{stem}.png")), b"png").unwrap();
    std::fs::write(export.join("labels").join(format!("{stem}.txt")), label).unwrap();
}

#[test]
fn test_validate_clean_export() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());
    write_pair(temp.path(), "frame_001", "0 0.5 0.5 0.2 0.2\n1 0.3 0.4 0.2 0.2\n");

    let mut cmd = Command::cargo_bin("anneal-cli").unwrap();
    cmd.current_dir(temp.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Export is clean"));
}

#[test]
fn test_validate_rejects_out_of_range_class() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());
    write_pair(temp.path(), "frame_001", "7 0.5 0.5 0.2 0.2\n");

    let mut cmd = Command::cargo_bin("anneal-cli").unwrap();
    cmd.current_dir(temp.path())
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Errors (1):"))
        .stderr(predicate::str::contains("validation found 1 error"));
}

#[test]
fn test_validate_rejects_malformed_line() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());
    write_pair(temp.path(), "frame_001", "0 0.5 0.5\n");

    let mut cmd = Command::cargo_bin("anneal-cli").unwrap();
    cmd.current_dir(temp.path()).arg("validate").assert().failure();
}

#[test]
fn test_validate_json_report() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());
    write_pair(temp.path(), "frame_001", "0 0.5 0.5 0.2 0.2\n");

    let mut cmd = Command::cargo_bin("anneal-cli").unwrap();
    let assert = cmd.current_dir(temp.path()).arg("validate").arg("--json").assert().success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["total_labels"], 1);
    assert_eq!(report["errors"], serde_json::json!([]));
}

#[test]
fn test_validate_without_classes_fails() {
    let temp = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("anneal-cli").unwrap();
    cmd.current_dir(temp.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no classes configured"));
}
