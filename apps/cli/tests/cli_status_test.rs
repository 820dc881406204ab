//! Integration tests for the `anneal status` command.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn scaffold(temp: &TempDir) {
    let mut cmd = Command::cargo_bin("anneal-cli").unwrap();
    cmd.current_dir(temp.path()).arg("init").assert().success();
}

#[test]
fn test_status_on_fresh_scaffold() {
    let temp = TempDir::new().unwrap();
    scaffold(&temp);

    let mut cmd = Command::cargo_bin("anneal-cli").unwrap();
    cmd.current_dir(temp.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pipeline Status"))
        .stdout(predicate::str::contains("Videos:"))
        .stdout(predicate::str::contains("Trained: 0"));
}

#[test]
fn test_status_counts_files() {
    let temp = TempDir::new().unwrap();
    scaffold(&temp);
    std::fs::write(temp.path().join("videos/match.mp4"), b"video").unwrap();
    std::fs::write(temp.path().join("frames/match_00001.png"), b"png").unwrap();
    std::fs::write(temp.path().join("frames/match_00002.png"), b"png").unwrap();

    let mut cmd = Command::cargo_bin("anneal-cli").unwrap();
    cmd.current_dir(temp.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found: 1"))
        .stdout(predicate::str::contains("Extracted: 2"));
}

#[test]
fn test_status_json_output() {
    let temp = TempDir::new().unwrap();
    scaffold(&temp);
    std::fs::write(temp.path().join("videos/match.mp4"), b"video").unwrap();

    let mut cmd = Command::cargo_bin("anneal-cli").unwrap();
    let assert = cmd.current_dir(temp.path()).arg("status").arg("--json").assert().success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    let status: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(status["videos"], 1);
    assert_eq!(status["versions"]["count"], 0);
    assert!(status["versions"]["latest"].is_null());
}
