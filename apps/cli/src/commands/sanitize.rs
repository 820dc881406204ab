//! Sanitize command implementation.

use anneal_dataset::{apply_sanitize, plan_sanitize, ExportLayout};
use anneal_training::PipelineConfig;
use anyhow::{Context, Result};
use colored::Colorize;
use inquire::Confirm;
use std::path::{Path, PathBuf};

/// Execute the sanitize command.
pub async fn execute(
    config_path: &Path,
    keep_percent: f64,
    export_dir: Option<PathBuf>,
    seed: Option<u64>,
    dry_run: bool,
    yes: bool,
) -> Result<()> {
    let config =
        PipelineConfig::load_or_default(config_path).context("Failed to load pipeline config")?;
    let export = export_dir.map_or_else(|| config.export_layout(), ExportLayout::new);
    let seed = seed.unwrap_or(config.split.seed);

    let plan =
        plan_sanitize(&export, keep_percent, seed).context("Failed to plan sanitization")?;

    println!();
    println!("{}", "Sanitize empty labels".bold().cyan());
    println!();
    println!("  Annotated pairs: {}", plan.annotated.to_string().green());
    println!("  Empty-label pairs: {}", plan.empty_total.to_string().yellow());
    println!("  Keeping: {} ({keep_percent}%)", plan.keep.to_string().green());
    println!("  Removing: {}", plan.remove.len().to_string().red());
    println!();

    if plan.remove.is_empty() {
        println!("  {}", "Nothing to remove.".dimmed());
        println!();
        return Ok(());
    }

    if dry_run {
        println!("  {}", "Dry run; nothing was deleted.".dimmed());
        println!();
        return Ok(());
    }

    if !yes {
        let confirmed =
            Confirm::new(&format!("Remove {} image/label pair(s)?", plan.remove.len()))
                .with_default(false)
                .prompt()?;
        if !confirmed {
            println!("  {}", "Aborted.".yellow());
            return Ok(());
        }
    }

    let removed = apply_sanitize(&plan).context("Failed to remove empty-label pairs")?;
    println!("  {} removed {} pair(s) ({removed} files)", "✓".green(), plan.remove.len());
    println!();

    Ok(())
}
