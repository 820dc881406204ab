//! Init command implementation.

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

/// Default pipeline config written by `anneal init`. Every value shown is
/// the built-in default; the file is meant to be edited.
const DEFAULT_CONFIG: &str = r#"# Anneal pipeline configuration.
# Paths are relative to the directory anneal runs in.

# Object classes in label-id order; ids in label files index this list.
classes:
  - ball
  - robot

paths:
  videos: videos
  frames: frames
  export: annotations/yolo_export
  dataset: data
  models: models

extraction:
  fps: 2.0
  workers: 4
  # Placeholders: {video} {stem} {output} {fps}
  command: "ffmpeg -y -i {video} -vf fps={fps} {output}/{stem}_%05d.png"

# External stage commands, run through the shell by `anneal pipeline`.
# A stage with no command is skipped. Placeholders: {frames} {export}
# stages:
#   upload: "gsutil -m rsync -r {frames} gs://my-bucket/frames"
#   import: "annotool import --dir {frames}"
#   export: "annotool export --format yolo --out {export}"

training:
  base_model: yolov8n.pt
  initial_epochs: 50
  incremental_epochs: 20
  batch_size: 16
  img_size: 640
  patience: 10
  # Annotation change ratio above which an incremental update becomes a
  # full retrain.
  retrain_threshold: 0.5
  # device: "0"
  command: yolo

split:
  train_ratio: 0.8
  val_ratio: 0.2
  seed: 42
"#;

/// Execute the init command.
///
/// Scaffolds the pipeline directory layout and writes the default config.
pub async fn execute(path: Option<PathBuf>, force: bool) -> Result<()> {
    let root = path.unwrap_or_else(|| PathBuf::from("."));

    println!("{}", "Initializing anneal pipeline".bold().cyan());
    println!();

    for dir in
        ["videos", "frames", "annotations/yolo_export", "data", "models", "configs"]
    {
        let target = root.join(dir);
        std::fs::create_dir_all(&target)?;
        println!("  {} {}/", "✓".green(), target.display());
    }

    let config_path = root.join("configs").join("pipeline.yaml");
    if config_path.exists() && !force {
        println!(
            "  {} {} {}",
            "•".yellow(),
            config_path.display(),
            "(exists, use --force to overwrite)".dimmed()
        );
    } else {
        std::fs::write(&config_path, DEFAULT_CONFIG)?;
        println!("  {} {}", "✓".green(), config_path.display());
    }

    println!();
    println!("{}", "Next steps:".bold());
    println!("  1. Drop source videos into {}", "videos/".cyan());
    println!("  2. Edit {} (classes, stage commands)", "configs/pipeline.yaml".cyan());
    println!("  3. Run {}", "anneal pipeline".cyan());
    println!();

    Ok(())
}
