use std::path::PathBuf;

use anneal_dataset::{DatasetFingerprint, DatasetStats};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::TrainingConfig;
use crate::store::VersionStore;
use crate::version::VersionId;

/// How a training run relates to the version history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// First version; no history exists.
    New,
    /// Dataset unchanged since the latest version; nothing runs.
    Skip,
    /// Dataset changed too much for a warm start; train from the base model.
    Retrain,
    /// Moderate change; continue from the latest version's checkpoint.
    Incremental,
}

impl Strategy {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Skip => "skip",
            Self::Retrain => "retrain",
            Self::Incremental => "incremental",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selector output: either nothing to do, or a concrete run to launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrainingPlan {
    Skip {
        latest: VersionId,
    },
    Run {
        strategy: Strategy,
        /// Starting weights: base model for new/retrain, parent checkpoint
        /// for incremental.
        checkpoint: PathBuf,
        epochs: u32,
    },
}

/// Relative annotation-count change between two dataset states.
///
/// A heuristic knob, not a convergence guarantee: it deliberately ignores
/// which annotations changed, only how many.
#[must_use]
pub fn change_ratio(old_total: u64, new_total: u64) -> f64 {
    (new_total as f64 - old_total as f64).abs() / (old_total as f64).max(1.0)
}

/// Decide what to run for the current dataset state.
///
/// Equal fingerprints always mean skip. Otherwise the change ratio picks
/// between a full retrain (strictly above the threshold) and an incremental
/// run; an incremental run whose parent checkpoint has vanished from disk
/// falls back to the base model but keeps the incremental epoch count.
#[must_use]
pub fn select_strategy(
    store: &VersionStore,
    fingerprint: &DatasetFingerprint,
    stats: &DatasetStats,
    training: &TrainingConfig,
) -> TrainingPlan {
    let Some(latest) = store.latest() else {
        return TrainingPlan::Run {
            strategy: Strategy::New,
            checkpoint: PathBuf::from(&training.base_model),
            epochs: training.initial_epochs,
        };
    };

    if latest.dataset_hash == *fingerprint {
        return TrainingPlan::Skip { latest: latest.version.clone() };
    }

    let ratio = change_ratio(latest.dataset_stats.total_annotations, stats.total_annotations);
    debug!(ratio, threshold = training.retrain_threshold, "dataset changed since latest version");

    if ratio > training.retrain_threshold {
        return TrainingPlan::Run {
            strategy: Strategy::Retrain,
            checkpoint: PathBuf::from(&training.base_model),
            epochs: training.initial_epochs,
        };
    }

    let checkpoint = if latest.checkpoint_path.is_file() {
        latest.checkpoint_path.clone()
    } else {
        warn!(
            checkpoint = %latest.checkpoint_path.display(),
            "parent checkpoint missing, starting incremental run from base model"
        );
        PathBuf::from(&training.base_model)
    };

    TrainingPlan::Run {
        strategy: Strategy::Incremental,
        checkpoint,
        epochs: training.incremental_epochs,
    }
}
