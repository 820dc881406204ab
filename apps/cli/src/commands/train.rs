//! Train command implementation.

use anneal_training::{
    IncrementalTrainer, PipelineConfig, TrainOutcome, TrainingError, YoloCommandTrainer,
};
use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use std::path::{Path, PathBuf};

use crate::commands::compare::print_comparison;

/// Execute the train command.
pub async fn execute(
    config_path: &Path,
    dataset: Option<PathBuf>,
    json_output: bool,
) -> Result<()> {
    let mut config =
        PipelineConfig::load_or_default(config_path).context("Failed to load pipeline config")?;
    if let Some(dataset) = dataset {
        config.paths.dataset = dataset;
    }

    let trainer = YoloCommandTrainer::new(config.training.command.clone());
    let pipeline = IncrementalTrainer::new(config, Box::new(trainer));

    let outcome = pipeline.train().await?;

    let record = match outcome {
        TrainOutcome::Skipped { latest } => {
            if json_output {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "skipped": true,
                        "latest": latest.as_str(),
                    }))?
                );
            } else {
                println!();
                println!(
                    "{} dataset unchanged since {}",
                    "Skipped:".yellow().bold(),
                    latest.to_string().cyan()
                );
                println!();
            }
            return Ok(());
        }
        TrainOutcome::Trained { record } => record,
    };

    // Two or more versions means there is a previous one to compare against.
    let comparison = match pipeline.compare(None, None) {
        Ok(comparison) => Some(comparison),
        Err(TrainingError::InsufficientHistory { .. }) => None,
        Err(e) => return Err(e.into()),
    };

    if json_output {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "record": record,
                "comparison": comparison,
            }))?
        );
        return Ok(());
    }

    println!();
    println!("{}", format!("Trained {}", record.version).bold().green());
    println!("  Strategy: {}", record.strategy.to_string().cyan());
    if let Some(parent) = &record.parent_version {
        println!("  Parent: {}", parent.to_string().cyan());
    }
    println!("  Epochs: {}", record.training_args.epochs);
    println!(
        "  Dataset: {} images, {} annotations ({})",
        record.dataset_stats.total_images,
        record.dataset_stats.total_annotations,
        record.dataset_hash
    );
    if let Some(map50) = record.metrics.map50 {
        println!("  mAP50: {}", format!("{map50:.3}").green());
    }
    println!("  Checkpoint: {}", record.checkpoint_path.display().to_string().dimmed());
    println!();

    if let Some(comparison) = comparison {
        print_comparison(&comparison);
    }

    Ok(())
}
