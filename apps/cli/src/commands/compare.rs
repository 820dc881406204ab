//! Compare command implementation.

use anneal_training::{
    IncrementalTrainer, PipelineConfig, VersionComparison, VersionId, YoloCommandTrainer,
};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

/// Execute the compare command.
pub async fn execute(
    config_path: &Path,
    baseline: Option<String>,
    candidate: Option<String>,
    json_output: bool,
) -> Result<()> {
    let config =
        PipelineConfig::load_or_default(config_path).context("Failed to load pipeline config")?;
    let trainer = YoloCommandTrainer::new(config.training.command.clone());
    let pipeline = IncrementalTrainer::new(config, Box::new(trainer));

    let baseline = baseline.map(VersionId);
    let candidate = candidate.map(VersionId);
    let comparison = pipeline.compare(baseline.as_ref(), candidate.as_ref())?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
        return Ok(());
    }

    print_comparison(&comparison);
    Ok(())
}

/// Render the metric table. Also used by `train` after a run.
pub(crate) fn print_comparison(comparison: &VersionComparison) {
    println!();
    println!(
        "{}",
        format!("Comparison {} vs {}", comparison.baseline, comparison.candidate).bold().cyan()
    );
    println!();
    println!(
        "  {:<12} {:>10} {:>10} {:>10} {:>9}",
        "Metric", "Baseline", "Candidate", "Diff", "Change"
    );
    println!("  {}", "─".repeat(56));
    for metric in &comparison.metrics {
        let change = metric.pct_change.map_or_else(
            || "-".normal(),
            |pct| {
                let text = format!("{pct:+.1}%");
                if pct > 0.0 {
                    text.green()
                } else if pct < 0.0 {
                    text.red()
                } else {
                    text.normal()
                }
            },
        );
        println!(
            "  {:<12} {:>10} {:>10} {:>10} {:>9}",
            metric.name,
            format_value(metric.baseline),
            format_value(metric.candidate),
            metric.diff.map_or_else(|| "-".to_string(), |d| format!("{d:+.3}")),
            change
        );
    }
    println!();
    println!("  Annotations: {:+}", comparison.annotation_delta);
    println!();
}

fn format_value(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"))
}
