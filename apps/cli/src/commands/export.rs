//! Export command implementation.

use anneal_training::{
    ExportFormat, IncrementalTrainer, PipelineConfig, VersionId, YoloCommandTrainer,
};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

/// Execute the export command.
pub async fn execute(config_path: &Path, format: &str, version: Option<String>) -> Result<()> {
    let format: ExportFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let config =
        PipelineConfig::load_or_default(config_path).context("Failed to load pipeline config")?;

    let trainer = YoloCommandTrainer::new(config.training.command.clone());
    let pipeline = IncrementalTrainer::new(config, Box::new(trainer));

    let version = version.map(VersionId);
    let artifact = pipeline.export(version.as_ref(), format).await?;

    println!();
    println!("{} {}", "Exported:".bold().green(), artifact.display());
    println!();

    Ok(())
}
