//! Validate command implementation.

use anneal_dataset::{validate_export, ExportLayout};
use anneal_training::PipelineConfig;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Execute the validate command.
///
/// Exits non-zero when the export has errors; warnings alone pass.
pub async fn execute(
    config_path: &Path,
    export_dir: Option<PathBuf>,
    json_output: bool,
) -> Result<()> {
    let config =
        PipelineConfig::load_or_default(config_path).context("Failed to load pipeline config")?;
    if config.classes.is_empty() {
        anyhow::bail!("no classes configured; add them to the pipeline config");
    }

    let export = export_dir.map_or_else(|| config.export_layout(), ExportLayout::new);
    let report = validate_export(&export, &config.classes, config.training.img_size)
        .context("Failed to validate annotation export")?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        println!("{}", "Annotation validation".bold().cyan());
        println!();
        println!("  Images: {}", report.total_images.to_string().green());
        println!("  Labels: {}", report.total_labels.to_string().green());
        println!("  Empty labels: {}", report.empty_labels);
        println!("  Annotations: {}", report.total_annotations.to_string().green());

        if !report.errors.is_empty() {
            println!();
            println!("  {}", format!("Errors ({}):", report.errors.len()).red().bold());
            for error in &report.errors {
                println!("    {} {}", "✗".red(), error);
            }
        }
        if !report.warnings.is_empty() {
            println!();
            println!("  {}", format!("Warnings ({}):", report.warnings.len()).yellow().bold());
            for warning in &report.warnings {
                println!("    {} {}", "!".yellow(), warning);
            }
        }
        println!();
        if report.is_clean() {
            println!("  {}", "Export is clean.".green());
            println!();
        }
    }

    if !report.is_clean() {
        anyhow::bail!("annotation validation found {} error(s)", report.errors.len());
    }
    Ok(())
}
