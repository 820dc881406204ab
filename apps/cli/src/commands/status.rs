//! Status command implementation.

use anneal_training::{PipelineConfig, VersionStore, VIDEO_EXTENSIONS};
use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use std::path::Path;

/// Execute the status command.
///
/// Everything here is derived from the filesystem; there is no state beyond
/// the directories and the version manifest.
pub async fn execute(config_path: &Path, json_output: bool) -> Result<()> {
    let config =
        PipelineConfig::load_or_default(config_path).context("Failed to load pipeline config")?;

    let videos = count_files(&config.paths.videos, VIDEO_EXTENSIONS);
    let frames = count_files(&config.paths.frames, &["png", "jpg", "jpeg"]);
    let uploaded = read_sync_state(&config.paths.frames);

    let export = config.export_layout();
    let export_images = count_files(&export.images_dir(), &["png", "jpg", "jpeg"]);
    let export_labels = count_files(&export.labels_dir(), &["txt"]);

    let dataset = config.dataset_layout();
    let train_images = count_files(&dataset.images_dir("train"), &["png", "jpg", "jpeg"]);
    let val_images = count_files(&dataset.images_dir("val"), &["png", "jpg", "jpeg"]);

    let store = VersionStore::load(config.model_layout().manifest_path())
        .context("Failed to load version manifest")?;

    if json_output {
        let latest = store.latest().map(|record| {
            json!({
                "version": record.version.as_str(),
                "strategy": record.strategy.as_str(),
                "map50": record.metrics.map50,
            })
        });
        let status = json!({
            "videos": videos,
            "frames": { "extracted": frames, "uploaded": uploaded },
            "export": { "images": export_images, "labels": export_labels },
            "dataset": { "train_images": train_images, "val_images": val_images },
            "versions": { "count": store.len(), "latest": latest },
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!("{}", "Pipeline Status".bold().cyan());
    println!();

    println!("{}", "Videos:".bold());
    println!("  Found: {}", videos.to_string().green());
    println!();

    println!("{}", "Frames:".bold());
    println!("  Extracted: {}", frames.to_string().green());
    match uploaded {
        Some(count) => println!("  Uploaded: {}", count.to_string().green()),
        None => println!("  Uploaded: {}", "no sync state".dimmed()),
    }
    println!();

    println!("{}", "Annotation export:".bold());
    println!("  Images: {}", export_images.to_string().green());
    println!("  Labels: {}", export_labels.to_string().green());
    println!();

    println!("{}", "Dataset:".bold());
    println!("  Train images: {}", train_images.to_string().green());
    println!("  Val images: {}", val_images.to_string().green());
    println!();

    println!("{}", "Versions:".bold());
    println!("  Trained: {}", store.len().to_string().green());
    if let Some(record) = store.latest() {
        let map50 = record
            .metrics
            .map50
            .map_or_else(|| "-".to_string(), |v| format!("{v:.3}"));
        println!(
            "  Latest: {} ({}, mAP50 {})",
            record.version.to_string().cyan(),
            record.strategy,
            map50
        );
    } else {
        println!("  Latest: {}", "none".dimmed());
    }
    println!();

    Ok(())
}

fn count_files(dir: &Path, extensions: &[&str]) -> u64 {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(std::result::Result::ok)
        .filter(|entry| {
            let path = entry.path();
            path.is_file()
                && path.extension().is_some_and(|ext| {
                    extensions.iter().any(|known| ext.eq_ignore_ascii_case(known))
                })
        })
        .count() as u64
}

/// The upload stage may leave a sync-state file mapping uploaded frame names;
/// its entry count is the best available "uploaded" figure.
fn read_sync_state(frames_dir: &Path) -> Option<u64> {
    let content = std::fs::read_to_string(frames_dir.join(".sync_state.json")).ok()?;
    let state: serde_json::Value = serde_json::from_str(&content).ok()?;
    state.as_object().map(|map| map.len() as u64)
}
