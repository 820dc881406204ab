//! Anneal Training
//!
//! Version-tracked incremental training on top of external detectors:
//! - Pipeline configuration (`PipelineConfig`)
//! - Append-only version store with lineage (`VersionStore`)
//! - Strategy selection from dataset change ratios
//! - Trainer boundary (`DetectionTrainer`) plus the Ultralytics CLI impl
//! - The orchestrator tying them together (`IncrementalTrainer`)

pub mod config;
pub mod error;
pub mod layout;
pub mod metrics;
pub mod orchestrator;
pub mod stages;
pub mod store;
pub mod strategy;
pub mod trainer;
pub mod version;

pub use config::{
    ExtractionConfig, PathsConfig, PipelineConfig, SplitConfig, StageCommands, TrainingConfig,
};
pub use error::{TrainingError, TrainingResult};
pub use layout::ModelLayout;
pub use metrics::{extract_best_metrics, TrainingMetrics};
pub use orchestrator::{IncrementalTrainer, MetricDelta, TrainOutcome, VersionComparison};
pub use stages::{extract_frames, run_stage_command, ExtractionSummary, VIDEO_EXTENSIONS};
pub use store::VersionStore;
pub use strategy::{change_ratio, select_strategy, Strategy, TrainingPlan};
pub use trainer::{DetectionTrainer, ExportFormat, TrainRequest, YoloCommandTrainer};
pub use version::{TrainingArgs, VersionId, VersionRecord};
