//! Integration tests for the `anneal split` command.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write_config(root: &std::path::Path) {
    std::fs::create_dir_all(root.join("configs")).unwrap();
    std::fs::write(root.join("configs/pipeline.yaml"), "classes:\n  - ball\n  - robot\n")
        .unwrap();
}

fn write_export(root: &std::path::Path, pairs: usize) {
    let export = root.join("annotations/yolo_export");
    std::fs::create_dir_all(export.join("images")).unwrap();
    std::fs::create_dir_all(export.join("labels")).unwrap();
    for i in 0..pairs {
        std::fs::write(export.join("images").join(format!("frame_{i:03}.png")), b"png").unwrap();
        std::fs::write(
            export.join("labels").join(format!("frame_{i:03}.txt")),
            "0 0.5 0.5 0.2 0.2\n",
        )
        .unwrap();
    }
}

#[test]
fn test_split_creates_train_val_and_data_config() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());
    write_export(temp.path(), 10);

    let mut cmd = Command::cargo_bin("anneal-cli").unwrap();
    cmd.current_dir(temp.path())
        .arg("split")
        .assert()
        .success()
        .stdout(predicate::str::contains("Train pairs: 8"))
        .stdout(predicate::str::contains("Val pairs: 2"));

    assert!(temp.path().join("data/images/train").is_dir());
    assert!(temp.path().join("data/images/val").is_dir());
    assert!(temp.path().join("data/labels/train").is_dir());

    let data_config = std::fs::read_to_string(temp.path().join("data/dataset.yaml")).unwrap();
    assert!(data_config.contains("nc: 2"));
    assert!(data_config.contains("ball"));
}

#[test]
fn test_split_is_seeded() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());
    write_export(temp.path(), 10);

    let run = |temp: &TempDir| -> Vec<String> {
        let mut cmd = Command::cargo_bin("anneal-cli").unwrap();
        cmd.current_dir(temp.path()).arg("split").assert().success();
        let mut names: Vec<String> = std::fs::read_dir(temp.path().join("data/images/train"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    };

    let first = run(&temp);
    let second = run(&temp);
    assert_eq!(first, second);
    assert_eq!(first.len(), 8);
}

#[test]
fn test_split_custom_ratio() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());
    write_export(temp.path(), 10);

    let mut cmd = Command::cargo_bin("anneal-cli").unwrap();
    cmd.current_dir(temp.path())
        .arg("split")
        .arg("--train-ratio")
        .arg("0.5")
        .arg("--val-ratio")
        .arg("0.5")
        .assert()
        .success()
        .stdout(predicate::str::contains("Train pairs: 5"))
        .stdout(predicate::str::contains("Val pairs: 5"));
}

#[test]
fn test_split_rejects_bad_ratios() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path());
    write_export(temp.path(), 4);

    let mut cmd = Command::cargo_bin("anneal-cli").unwrap();
    cmd.current_dir(temp.path())
        .arg("split")
        .arg("--train-ratio")
        .arg("0.9")
        .arg("--val-ratio")
        .arg("0.9")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ratio"));
}
