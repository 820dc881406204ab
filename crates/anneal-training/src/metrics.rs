use std::path::Path;

use serde::{Deserialize, Serialize};

/// Best-epoch evaluation metrics for one training run.
///
/// Every field is optional: a run whose results log is missing or malformed
/// carries an empty set rather than failing the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub best_epoch: Option<u32>,
    #[serde(rename = "mAP50")]
    pub map50: Option<f64>,
    #[serde(rename = "mAP50-95")]
    pub map50_95: Option<f64>,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub fitness: Option<f64>,
}

impl TrainingMetrics {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// Ultralytics writes space-padded headers like `   metrics/mAP50(B)`;
// the reader trims them before matching.
const COL_PRECISION: &str = "metrics/precision(B)";
const COL_RECALL: &str = "metrics/recall(B)";
const COL_MAP50: &str = "metrics/mAP50(B)";
const COL_MAP50_95: &str = "metrics/mAP50-95(B)";
const COL_FITNESS: &str = "fitness";

/// Pull the best epoch's metrics out of a trainer `results.csv`.
///
/// Rows are ranked by the `fitness` column when present, otherwise by the
/// trainer's own weighting `0.1 * mAP50 + 0.9 * mAP50-95`. A missing or
/// unusable file reads as empty metrics.
#[must_use]
pub fn extract_best_metrics(results_csv: &Path) -> TrainingMetrics {
    read_best_row(results_csv).unwrap_or_default()
}

fn read_best_row(path: &Path) -> Option<TrainingMetrics> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path).ok()?;
    let headers = reader.headers().ok()?.clone();
    let col = |name: &str| headers.iter().position(|h| h == name);

    let precision_col = col(COL_PRECISION);
    let recall_col = col(COL_RECALL);
    let map50_col = col(COL_MAP50);
    let map50_95_col = col(COL_MAP50_95);
    let fitness_col = col(COL_FITNESS);

    let mut best: Option<(f64, TrainingMetrics)> = None;
    for (row, record) in reader.records().enumerate() {
        let Ok(record) = record else { continue };
        let field = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i)).and_then(|v| v.parse::<f64>().ok())
        };

        let map50 = field(map50_col);
        let map50_95 = field(map50_95_col);
        let fitness = field(fitness_col).or_else(|| match (map50, map50_95) {
            (Some(a), Some(b)) => Some(0.1 * a + 0.9 * b),
            _ => None,
        });
        let Some(fitness) = fitness else { continue };

        if best.as_ref().is_none_or(|(top, _)| fitness > *top) {
            best = Some((
                fitness,
                TrainingMetrics {
                    best_epoch: Some(row as u32 + 1),
                    map50,
                    map50_95,
                    precision: field(precision_col),
                    recall: field(recall_col),
                    fitness: Some(fitness),
                },
            ));
        }
    }
    best.map(|(_, metrics)| metrics)
}
