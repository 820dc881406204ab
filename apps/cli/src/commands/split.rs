//! Split command implementation.

use anneal_dataset::{split_dataset, ExportLayout, SplitOptions, SplitSummary};
use anneal_training::PipelineConfig;
use anyhow::{Context, Result};
use colored::Colorize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Execute the split command.
pub async fn execute(
    config_path: &Path,
    export_dir: Option<PathBuf>,
    train_ratio: Option<f64>,
    val_ratio: Option<f64>,
    seed: Option<u64>,
) -> Result<()> {
    let config =
        PipelineConfig::load_or_default(config_path).context("Failed to load pipeline config")?;

    let opts = SplitOptions {
        train_ratio: train_ratio.unwrap_or(config.split.train_ratio),
        val_ratio: val_ratio.unwrap_or(config.split.val_ratio),
        seed: seed.unwrap_or(config.split.seed),
    };
    let export = export_dir.map_or_else(|| config.export_layout(), ExportLayout::new);

    run_split(&config, &export, &opts)?;
    Ok(())
}

/// Split the export into train/val and print the per-class analysis.
/// Shared with the pipeline command.
pub(crate) fn run_split(
    config: &PipelineConfig,
    export: &ExportLayout,
    opts: &SplitOptions,
) -> Result<SplitSummary> {
    if config.classes.is_empty() {
        anyhow::bail!("no classes configured; add them to the pipeline config");
    }

    let summary = split_dataset(export, &config.dataset_layout(), &config.classes, opts)
        .context("Failed to split dataset")?;

    println!();
    println!("{}", "Dataset split".bold().cyan());
    println!();
    println!("  Train pairs: {}", summary.train_pairs.to_string().green());
    println!("  Val pairs: {}", summary.val_pairs.to_string().green());
    if summary.unmatched_labels > 0 {
        println!(
            "  {} {} label file(s) had no matching image and were left out",
            "!".yellow(),
            summary.unmatched_labels
        );
    }

    println!();
    println!("  {}", "Class distribution:".bold());
    println!("  {:<16} {:>8} {:>8}", "Class", "Train", "Val");
    println!("  {}", "─".repeat(34));
    let class_ids: BTreeSet<u32> = summary
        .train_classes
        .keys()
        .chain(summary.val_classes.keys())
        .copied()
        .collect();
    for class_id in class_ids {
        let name = config
            .classes
            .get(class_id as usize)
            .cloned()
            .unwrap_or_else(|| format!("class {class_id}"));
        let train = summary.train_classes.get(&class_id).copied().unwrap_or(0);
        let val = summary.val_classes.get(&class_id).copied().unwrap_or(0);
        println!("  {:<16} {:>8} {:>8}", name, train, val);
    }
    println!();

    Ok(summary)
}
