use std::path::{Path, PathBuf};

use anneal_dataset::{collect_stats, fingerprint_labels, DatasetLayout};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::{TrainingError, TrainingResult};
use crate::layout::ModelLayout;
use crate::metrics::{extract_best_metrics, TrainingMetrics};
use crate::store::VersionStore;
use crate::strategy::{select_strategy, TrainingPlan};
use crate::trainer::{DetectionTrainer, ExportFormat, TrainRequest};
use crate::version::{TrainingArgs, VersionId, VersionRecord};

/// Metrics walked by version comparison, in display order.
const COMPARED_METRICS: [(&str, fn(&TrainingMetrics) -> Option<f64>); 4] = [
    ("mAP50", |m| m.map50),
    ("mAP50-95", |m| m.map50_95),
    ("precision", |m| m.precision),
    ("recall", |m| m.recall),
];

/// Result of one `train` invocation.
#[derive(Debug)]
pub enum TrainOutcome {
    /// Dataset unchanged; no run, no new record.
    Skipped { latest: VersionId },
    /// A new version was trained and appended.
    Trained { record: VersionRecord },
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricDelta {
    pub name: String,
    pub baseline: Option<f64>,
    pub candidate: Option<f64>,
    pub diff: Option<f64>,
    /// Percent change relative to the baseline; zero when the baseline
    /// value is zero.
    pub pct_change: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionComparison {
    pub baseline: VersionId,
    pub candidate: VersionId,
    pub metrics: Vec<MetricDelta>,
    pub annotation_delta: i64,
}

/// Drives the full version lifecycle: fingerprint the dataset, pick a
/// strategy, run the external trainer, record the result, and serve
/// comparison/export over the history.
pub struct IncrementalTrainer {
    config: PipelineConfig,
    dataset: DatasetLayout,
    models: ModelLayout,
    trainer: Box<dyn DetectionTrainer>,
}

impl IncrementalTrainer {
    #[must_use]
    pub fn new(config: PipelineConfig, trainer: Box<dyn DetectionTrainer>) -> Self {
        let dataset = config.dataset_layout();
        let models = config.model_layout();
        Self { config, dataset, models, trainer }
    }

    /// Load the version store backing this pipeline.
    pub fn store(&self) -> TrainingResult<VersionStore> {
        VersionStore::load(self.models.manifest_path())
    }

    /// Fingerprint the dataset, select a strategy against the history, and
    /// run it. Skip touches nothing; a run appends exactly one record and
    /// rewrites the latest pointer. A trainer failure or a missing weights
    /// file aborts before anything is recorded.
    pub async fn train(&self) -> TrainingResult<TrainOutcome> {
        let mut store = self.store()?;
        let fingerprint = fingerprint_labels(&self.dataset)?;
        let stats = collect_stats(&self.dataset)?;

        let plan = select_strategy(&store, &fingerprint, &stats, &self.config.training);
        let (strategy, checkpoint, epochs) = match plan {
            TrainingPlan::Skip { latest } => {
                info!(version = %latest, "dataset unchanged, skipping training");
                return Ok(TrainOutcome::Skipped { latest });
            }
            TrainingPlan::Run { strategy, checkpoint, epochs } => (strategy, checkpoint, epochs),
        };

        let version = store.next_version_id();
        info!(
            version = %version,
            strategy = %strategy,
            images = stats.total_images,
            annotations = stats.total_annotations,
            "starting training run"
        );
        self.models.ensure_version_dirs(&version)?;

        let request = TrainRequest {
            data_config: self.dataset.data_config_path(),
            checkpoint,
            epochs,
            batch_size: self.config.training.batch_size,
            img_size: self.config.training.img_size,
            patience: self.config.training.patience,
            device: self.config.training.device.clone(),
            run_dir: self.models.run_dir(&version),
        };
        self.trainer.train(&request).await?;

        let trained_weights = self.models.run_weights_path(&version);
        if !trained_weights.is_file() {
            return Err(TrainingError::CheckpointMissing(trained_weights));
        }
        let checkpoint_path = self.models.checkpoint_path(&version);
        std::fs::copy(&trained_weights, &checkpoint_path)?;

        let metrics = extract_best_metrics(&self.models.run_results_path(&version));

        let record = VersionRecord {
            version: version.clone(),
            timestamp: Utc::now(),
            strategy,
            parent_version: None, // assigned by the store on append
            checkpoint_path,
            dataset_hash: fingerprint,
            dataset_stats: stats,
            training_args: TrainingArgs {
                epochs,
                batch_size: self.config.training.batch_size,
                img_size: self.config.training.img_size,
            },
            metrics,
        };
        store.append(record)?;
        self.models.write_latest_pointer(&version)?;

        let record = store.get(&version)?.clone();
        info!(version = %version, "training run recorded");
        Ok(TrainOutcome::Trained { record })
    }

    /// Compare two versions metric by metric. Arguments default to the two
    /// most recent records; fewer than two stored versions is an error
    /// regardless of what was asked for.
    pub fn compare(
        &self,
        baseline: Option<&VersionId>,
        candidate: Option<&VersionId>,
    ) -> TrainingResult<VersionComparison> {
        let store = self.store()?;
        if store.len() < 2 {
            return Err(TrainingError::InsufficientHistory { have: store.len() });
        }

        let records = store.records();
        let baseline = match baseline {
            Some(id) => store.get(id)?,
            None => &records[records.len() - 2],
        };
        let candidate = match candidate {
            Some(id) => store.get(id)?,
            None => &records[records.len() - 1],
        };

        let metrics = COMPARED_METRICS
            .iter()
            .map(|(name, read)| {
                let b = read(&baseline.metrics);
                let c = read(&candidate.metrics);
                let diff = match (b, c) {
                    (Some(b), Some(c)) => Some(c - b),
                    _ => None,
                };
                let pct_change = match (b, diff) {
                    (Some(b), Some(d)) if b > 0.0 => Some(d / b * 100.0),
                    (Some(_), Some(_)) => Some(0.0),
                    _ => None,
                };
                MetricDelta {
                    name: (*name).to_string(),
                    baseline: b,
                    candidate: c,
                    diff,
                    pct_change,
                }
            })
            .collect();

        Ok(VersionComparison {
            baseline: baseline.version.clone(),
            candidate: candidate.version.clone(),
            metrics,
            annotation_delta: candidate.dataset_stats.total_annotations as i64
                - baseline.dataset_stats.total_annotations as i64,
        })
    }

    /// Convert a version's checkpoint (default: the latest) and move the
    /// artifact into that version's `exports/` directory. Returns the final
    /// artifact path.
    pub async fn export(
        &self,
        version: Option<&VersionId>,
        format: ExportFormat,
    ) -> TrainingResult<PathBuf> {
        let store = self.store()?;
        let record = match version {
            Some(id) => store.get(id)?,
            None => store.latest().ok_or(TrainingError::NoVersions)?,
        };

        if !record.checkpoint_path.is_file() {
            return Err(TrainingError::CheckpointMissing(record.checkpoint_path.clone()));
        }

        let produced = self
            .trainer
            .export(&record.checkpoint_path, format, self.config.training.img_size)
            .await?;

        let exports_dir = self.models.exports_dir(&record.version);
        std::fs::create_dir_all(&exports_dir)?;
        let target = exports_dir.join(format!("model.{}", format.extension()));
        move_file(&produced, &target)?;

        info!(version = %record.version, artifact = %target.display(), "export complete");
        Ok(target)
    }
}

/// Rename with a copy-and-unlink fallback for cross-device moves.
fn move_file(from: &Path, to: &Path) -> TrainingResult<()> {
    if std::fs::rename(from, to).is_err() {
        std::fs::copy(from, to)?;
        std::fs::remove_file(from)?;
    }
    Ok(())
}
