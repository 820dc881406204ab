//! Extract command implementation.

use anneal_training::{extract_frames, PipelineConfig};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

/// Execute the extract command.
pub async fn execute(config_path: &Path, workers: Option<usize>) -> Result<()> {
    let mut config =
        PipelineConfig::load_or_default(config_path).context("Failed to load pipeline config")?;
    if let Some(workers) = workers {
        config.extraction.workers = workers;
    }

    println!("{}", "Extracting frames".bold().cyan());

    let summary =
        extract_frames(&config.paths.videos, &config.paths.frames, &config.extraction).await?;

    println!();
    println!("  Videos: {}", summary.videos.to_string().green());
    println!("  Extracted: {}", summary.extracted.to_string().green());
    if summary.skipped > 0 {
        println!("  Skipped (frames exist): {}", summary.skipped.to_string().yellow());
    }
    if !summary.failed.is_empty() {
        println!("  Failed: {}", summary.failed.len().to_string().red());
        for stem in &summary.failed {
            println!("    {} {}", "✗".red(), stem);
        }
    }
    println!();

    Ok(())
}
