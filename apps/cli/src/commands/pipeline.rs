//! Pipeline command implementation.
//!
//! The pipeline runs in two phases split by the manual labeling step:
//! prepare (extract → upload → import) and resume (export → split → train).

use anneal_dataset::SplitOptions;
use anneal_training::{extract_frames, run_stage_command, PipelineConfig};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

/// Execute the pipeline command.
pub async fn execute(config_path: &Path, resume_after_labeling: bool) -> Result<()> {
    let config =
        PipelineConfig::load_or_default(config_path).context("Failed to load pipeline config")?;

    if resume_after_labeling {
        resume(config_path, &config).await
    } else {
        prepare(&config).await
    }
}

/// Phase one: frames out of videos, frames into the annotation tool.
async fn prepare(config: &PipelineConfig) -> Result<()> {
    println!("{}", "Pipeline: preparing frames for annotation".bold().cyan());
    println!();

    if !config.paths.videos.is_dir() {
        anyhow::bail!(
            "videos directory {} does not exist; run `anneal init` first",
            config.paths.videos.display()
        );
    }

    let summary =
        extract_frames(&config.paths.videos, &config.paths.frames, &config.extraction).await?;
    println!(
        "  {} extract: {} video(s), {} extracted, {} skipped",
        "✓".green(),
        summary.videos,
        summary.extracted,
        summary.skipped
    );
    if !summary.failed.is_empty() {
        anyhow::bail!("frame extraction failed for {} video(s)", summary.failed.len());
    }

    run_stage(config, "upload", config.stages.upload.as_deref()).await?;
    run_stage(config, "import", config.stages.import.as_deref()).await?;

    println!();
    println!("{}", "Frames are staged for annotation.".bold());
    println!(
        "  Label them in your annotation tool, then run {}",
        "anneal pipeline --resume-after-labeling".cyan()
    );
    println!();
    Ok(())
}

/// Phase two: annotations back out, split, train.
async fn resume(config_path: &Path, config: &PipelineConfig) -> Result<()> {
    println!("{}", "Pipeline: export, split, train".bold().cyan());
    println!();

    run_stage(config, "export", config.stages.export.as_deref()).await?;

    let export = config.export_layout();
    if !export.labels_dir().is_dir() {
        anyhow::bail!(
            "no labels at {}; configure the export stage or export manually",
            export.labels_dir().display()
        );
    }

    let opts = SplitOptions {
        train_ratio: config.split.train_ratio,
        val_ratio: config.split.val_ratio,
        seed: config.split.seed,
    };
    crate::commands::split::run_split(config, &export, &opts)?;

    crate::commands::train::execute(config_path, None, false).await
}

async fn run_stage(config: &PipelineConfig, stage: &str, template: Option<&str>) -> Result<()> {
    let Some(template) = template else {
        println!("  {} {} {}", "•".yellow(), stage, "(no command configured, skipped)".dimmed());
        return Ok(());
    };
    let vars = [
        ("frames", config.paths.frames.display().to_string()),
        ("export", config.paths.export.display().to_string()),
    ];
    run_stage_command(stage, template, &vars).await?;
    println!("  {} {}", "✓".green(), stage);
    Ok(())
}
