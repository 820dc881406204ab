use std::path::PathBuf;

use anneal_dataset::{DatasetFingerprint, DatasetStats};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::TrainingMetrics;
use crate::strategy::Strategy;

/// Sequential version identifier: `v1`, `v2`, ...
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionId(pub String);

impl VersionId {
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(format!("v{index}"))
    }

    /// Numeric part of a `v{n}` identifier, when it follows the convention.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.0.strip_prefix('v')?.parse().ok()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VersionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for VersionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Hyperparameters actually used for one run, kept for reproducibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingArgs {
    pub epochs: u32,
    pub batch_size: u32,
    pub img_size: u32,
}

/// One completed training run in the version manifest. Immutable once
/// appended; `parent_version` links records into a linear chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionRecord {
    pub version: VersionId,
    pub timestamp: DateTime<Utc>,
    pub strategy: Strategy,
    pub parent_version: Option<VersionId>,
    pub checkpoint_path: PathBuf,
    pub dataset_hash: DatasetFingerprint,
    pub dataset_stats: DatasetStats,
    pub training_args: TrainingArgs,
    #[serde(default)]
    pub metrics: TrainingMetrics,
}
