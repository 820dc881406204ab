//! Versions command implementation.

use anneal_training::{PipelineConfig, VersionStore};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct VersionRow {
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Strategy")]
    strategy: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Images")]
    images: u64,
    #[tabled(rename = "Annotations")]
    annotations: u64,
    #[tabled(rename = "mAP50")]
    map50: String,
}

/// Execute the versions command.
///
/// Lists every trained version from the manifest.
pub async fn execute(config_path: &Path, json_output: bool) -> Result<()> {
    let config =
        PipelineConfig::load_or_default(config_path).context("Failed to load pipeline config")?;
    let store = VersionStore::load(config.model_layout().manifest_path())
        .context("Failed to load version manifest")?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(store.records())?);
        return Ok(());
    }

    println!();
    println!("{}", format!("Model Versions ({})", store.len()).bold().cyan());
    println!();

    if store.is_empty() {
        println!("  {}", "No versions trained yet.".dimmed());
        println!("  {}", "Run `anneal train` after splitting an exported dataset.".dimmed());
        println!();
        return Ok(());
    }

    let rows: Vec<VersionRow> = store
        .records()
        .iter()
        .map(|record| VersionRow {
            version: record.version.to_string(),
            strategy: record.strategy.to_string(),
            created: record.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            images: record.dataset_stats.total_images,
            annotations: record.dataset_stats.total_annotations,
            map50: record
                .metrics
                .map50
                .map_or_else(|| "-".to_string(), |v| format!("{v:.3}")),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!();

    Ok(())
}
