use std::path::{Path, PathBuf};

use anneal_dataset::{DatasetLayout, ExportLayout};
use serde::{Deserialize, Serialize};

use crate::error::{TrainingError, TrainingResult};
use crate::layout::ModelLayout;

/// Whole-pipeline configuration, loaded once from `configs/pipeline.yaml`
/// and passed by reference; nothing reads it ambiently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Class names in label-id order.
    #[serde(default)]
    pub classes: Vec<String>,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub stages: StageCommands,

    #[serde(default)]
    pub training: TrainingConfig,

    #[serde(default)]
    pub split: SplitConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Source videos awaiting frame extraction.
    #[serde(default = "default_videos_dir")]
    pub videos: PathBuf,

    /// Extracted frames staged for upload/annotation.
    #[serde(default = "default_frames_dir")]
    pub frames: PathBuf,

    /// Flat annotation export (images/ + labels/) from the labeling tool.
    #[serde(default = "default_export_dir")]
    pub export: PathBuf,

    /// Split dataset the trainer consumes.
    #[serde(default = "default_dataset_dir")]
    pub dataset: PathBuf,

    /// Versioned model artifacts.
    #[serde(default = "default_models_dir")]
    pub models: PathBuf,
}

fn default_videos_dir() -> PathBuf {
    PathBuf::from("videos")
}

fn default_frames_dir() -> PathBuf {
    PathBuf::from("frames")
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("annotations").join("yolo_export")
}

fn default_dataset_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("models")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            videos: default_videos_dir(),
            frames: default_frames_dir(),
            export: default_export_dir(),
            dataset: default_dataset_dir(),
            models: default_models_dir(),
        }
    }
}

/// Frame extraction runs an external command once per video; decoding never
/// happens in-process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Frames per second to sample.
    #[serde(default = "default_fps")]
    pub fps: f64,

    /// How many videos to process at once.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Extractor command template. Placeholders: `{video}`, `{stem}`,
    /// `{output}`, `{fps}`.
    #[serde(default = "default_extract_command")]
    pub command: String,
}

fn default_fps() -> f64 {
    2.0
}

fn default_workers() -> usize {
    4
}

fn default_extract_command() -> String {
    "ffmpeg -y -i {video} -vf fps={fps} {output}/{stem}_%05d.png".to_string()
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self { fps: default_fps(), workers: default_workers(), command: default_extract_command() }
    }
}

/// External commands for the upload/import/export stages. A stage with no
/// command configured is skipped with a note. Placeholders: `{frames}`,
/// `{export}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCommands {
    #[serde(default)]
    pub upload: Option<String>,

    #[serde(default)]
    pub import: Option<String>,

    #[serde(default)]
    pub export: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Starting weights for full (re)training runs.
    #[serde(default = "default_base_model")]
    pub base_model: String,

    /// Epochs for `new`/`retrain` runs.
    #[serde(default = "default_initial_epochs")]
    pub initial_epochs: u32,

    /// Epochs for `incremental` runs.
    #[serde(default = "default_incremental_epochs")]
    pub incremental_epochs: u32,

    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    #[serde(default = "default_img_size")]
    pub img_size: u32,

    /// Early-stopping patience handed to the trainer.
    #[serde(default = "default_patience")]
    pub patience: u32,

    /// Annotation change ratio above which an incremental update becomes a
    /// full retrain. Strictly greater-than; a ratio equal to the threshold
    /// stays incremental.
    #[serde(default = "default_retrain_threshold")]
    pub retrain_threshold: f64,

    /// Device string forwarded to the trainer (e.g. `0`, `cpu`, `mps`).
    #[serde(default)]
    pub device: Option<String>,

    /// Trainer executable.
    #[serde(default = "default_trainer_command")]
    pub command: String,
}

fn default_base_model() -> String {
    "yolov8n.pt".to_string()
}

fn default_initial_epochs() -> u32 {
    50
}

fn default_incremental_epochs() -> u32 {
    20
}

fn default_batch_size() -> u32 {
    16
}

fn default_img_size() -> u32 {
    640
}

fn default_patience() -> u32 {
    10
}

fn default_retrain_threshold() -> f64 {
    0.5
}

fn default_trainer_command() -> String {
    "yolo".to_string()
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            base_model: default_base_model(),
            initial_epochs: default_initial_epochs(),
            incremental_epochs: default_incremental_epochs(),
            batch_size: default_batch_size(),
            img_size: default_img_size(),
            patience: default_patience(),
            retrain_threshold: default_retrain_threshold(),
            device: None,
            command: default_trainer_command(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    #[serde(default = "default_train_ratio")]
    pub train_ratio: f64,

    #[serde(default = "default_val_ratio")]
    pub val_ratio: f64,

    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_train_ratio() -> f64 {
    0.8
}

fn default_val_ratio() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_ratio: default_train_ratio(),
            val_ratio: default_val_ratio(),
            seed: default_seed(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> TrainingResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| TrainingError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> TrainingResult<Self> {
        if path.is_file() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> TrainingResult<()> {
        let t = &self.training;
        if t.base_model.trim().is_empty() {
            return Err(TrainingError::Config("training.base_model is required".to_string()));
        }
        if t.command.trim().is_empty() {
            return Err(TrainingError::Config("training.command is required".to_string()));
        }
        if t.initial_epochs == 0 || t.incremental_epochs == 0 {
            return Err(TrainingError::Config("epoch counts must be >= 1".to_string()));
        }
        if t.batch_size == 0 {
            return Err(TrainingError::Config("training.batch_size must be >= 1".to_string()));
        }
        if t.img_size < 32 {
            return Err(TrainingError::Config("training.img_size must be >= 32".to_string()));
        }
        if !t.retrain_threshold.is_finite() || t.retrain_threshold < 0.0 {
            return Err(TrainingError::Config(
                "training.retrain_threshold must be a non-negative number".to_string(),
            ));
        }

        if self.split.train_ratio <= 0.0 || self.split.val_ratio <= 0.0 {
            return Err(TrainingError::Config("split ratios must be positive".to_string()));
        }
        if (self.split.train_ratio + self.split.val_ratio - 1.0).abs() > 1e-6 {
            return Err(TrainingError::Config("split ratios must sum to 1.0".to_string()));
        }

        if self.extraction.workers == 0 {
            return Err(TrainingError::Config("extraction.workers must be >= 1".to_string()));
        }
        if self.extraction.fps <= 0.0 {
            return Err(TrainingError::Config("extraction.fps must be > 0".to_string()));
        }
        if self.extraction.command.trim().is_empty() {
            return Err(TrainingError::Config("extraction.command is required".to_string()));
        }
        Ok(())
    }

    #[must_use]
    pub fn dataset_layout(&self) -> DatasetLayout {
        DatasetLayout::new(self.paths.dataset.clone())
    }

    #[must_use]
    pub fn export_layout(&self) -> ExportLayout {
        ExportLayout::new(self.paths.export.clone())
    }

    #[must_use]
    pub fn model_layout(&self) -> ModelLayout {
        ModelLayout::new(self.paths.models.clone())
    }
}
