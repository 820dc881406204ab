//! Integration tests for the `anneal pipeline` command's two phases:
//! prepare (extract, upload, import) and resume (export, split, train).
#![cfg(unix)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

/// Stands in for the Ultralytics CLI; only the train branch matters here.
const FAKE_TRAINER: &str = r#"#!/bin/sh
project=""
name=""
for arg in "$@"; do
  case "$arg" in
    project=*) project="${arg#project=}" ;;
    name=*) name="${arg#name=}" ;;
  esac
done
mkdir -p "$project/$name/weights"
printf 'weights' > "$project/$name/weights/best.pt"
printf 'epoch, metrics/mAP50(B), metrics/mAP50-95(B)\n0, 0.50, 0.40\n' > "$project/$name/results.csv"
"#;

fn write_config(root: &Path, body: &str) {
    std::fs::create_dir_all(root.join("configs")).unwrap();
    std::fs::write(root.join("configs/pipeline.yaml"), body).unwrap();
}

fn anneal(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("anneal-cli").unwrap();
    cmd.current_dir(temp.path());
    cmd
}

#[test]
fn test_prepare_fails_without_videos_dir() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path(), "classes:\n  - ball\n");

    anneal(&temp)
        .arg("pipeline")
        .assert()
        .failure()
        .stderr(predicate::str::contains("run `anneal init` first"));
}

#[test]
fn test_prepare_extracts_and_skips_unconfigured_stages() {
    let temp = TempDir::new().unwrap();
    write_config(
        temp.path(),
        "classes:\n  - ball\nextraction:\n  command: \"touch {output}/{stem}_00001.png\"\n",
    );
    std::fs::create_dir_all(temp.path().join("videos")).unwrap();
    std::fs::write(temp.path().join("videos/match.mp4"), b"video").unwrap();

    anneal(&temp)
        .arg("pipeline")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract: 1 video(s), 1 extracted, 0 skipped"))
        .stdout(predicate::str::contains("(no command configured, skipped)"))
        .stdout(predicate::str::contains("Frames are staged for annotation."));

    assert!(temp.path().join("frames/match_00001.png").is_file());
}

#[test]
fn test_prepare_runs_configured_stage_commands() {
    let temp = TempDir::new().unwrap();
    write_config(
        temp.path(),
        concat!(
            "classes:\n  - ball\n",
            "extraction:\n  command: \"touch {output}/{stem}_00001.png\"\n",
            "stages:\n  upload: \"touch {frames}/.uploaded\"\n",
        ),
    );
    std::fs::create_dir_all(temp.path().join("videos")).unwrap();
    std::fs::write(temp.path().join("videos/match.mp4"), b"video").unwrap();

    anneal(&temp)
        .arg("pipeline")
        .assert()
        .success()
        .stdout(predicate::str::contains("upload (no command configured").not());

    assert!(temp.path().join("frames/.uploaded").is_file());
}

#[test]
fn test_resume_runs_export_split_and_train() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let script = temp.path().join("fake_trainer.sh");
    std::fs::write(&script, FAKE_TRAINER).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    write_config(
        temp.path(),
        &format!(
            concat!(
                "classes:\n  - ball\n  - robot\n",
                "training:\n  command: \"{}\"\n",
                "stages:\n  export: \"mkdir -p annotations && cp -r staged {{export}}\"\n",
            ),
            script.display()
        ),
    );

    // The export stage copies this staged annotation dump into place.
    let staged = temp.path().join("staged");
    std::fs::create_dir_all(staged.join("images")).unwrap();
    std::fs::create_dir_all(staged.join("labels")).unwrap();
    for i in 0..4 {
        std::fs::write(staged.join("images").join(format!("frame_{i:03}.png")), b"png").unwrap();
        std::fs::write(
            staged.join("labels").join(format!("frame_{i:03}.txt")),
            "0 0.5 0.5 0.2 0.2\n",
        )
        .unwrap();
    }

    anneal(&temp)
        .arg("pipeline")
        .arg("--resume-after-labeling")
        .assert()
        .success()
        .stdout(predicate::str::contains("Train pairs: 3"))
        .stdout(predicate::str::contains("Trained v1"))
        .stdout(predicate::str::contains("Strategy: new"));

    assert!(temp.path().join("annotations/yolo_export/labels/frame_000.txt").is_file());
    assert!(temp.path().join("models/versions/v1/best.pt").is_file());
    assert_eq!(
        std::fs::read_to_string(temp.path().join("models/versions/LATEST")).unwrap(),
        "v1\n"
    );
}

#[test]
fn test_resume_fails_without_annotation_export() {
    let temp = TempDir::new().unwrap();
    write_config(temp.path(), "classes:\n  - ball\n");

    anneal(&temp)
        .arg("pipeline")
        .arg("--resume-after-labeling")
        .assert()
        .failure()
        .stderr(predicate::str::contains("configure the export stage"));
}
