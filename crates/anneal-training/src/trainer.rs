use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::info;

use crate::error::{TrainingError, TrainingResult};

/// Target format for checkpoint conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Onnx,
    Torchscript,
    Coreml,
    Tflite,
}

impl ExportFormat {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Onnx => "onnx",
            Self::Torchscript => "torchscript",
            Self::Coreml => "coreml",
            Self::Tflite => "tflite",
        }
    }

    /// File extension of the artifact the converter produces.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Onnx => "onnx",
            Self::Torchscript => "torchscript",
            Self::Coreml => "mlpackage",
            Self::Tflite => "tflite",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "onnx" => Ok(Self::Onnx),
            "torchscript" => Ok(Self::Torchscript),
            "coreml" => Ok(Self::Coreml),
            "tflite" => Ok(Self::Tflite),
            other => Err(format!(
                "unknown export format '{other}' (expected onnx, torchscript, coreml or tflite)"
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a backend needs for one training session.
#[derive(Debug, Clone)]
pub struct TrainRequest {
    /// YOLO data config describing the split dataset.
    pub data_config: PathBuf,
    /// Starting weights: a base model name or a previous checkpoint.
    pub checkpoint: PathBuf,
    pub epochs: u32,
    pub batch_size: u32,
    pub img_size: u32,
    pub patience: u32,
    pub device: Option<String>,
    /// Run directory the backend must fill: `weights/best.pt` and
    /// `results.csv` are read from here afterwards.
    pub run_dir: PathBuf,
}

/// Boundary to the external detection trainer.
#[async_trait]
pub trait DetectionTrainer: Send + Sync {
    fn id(&self) -> &'static str;

    /// Run one training session to completion. Blocking from the caller's
    /// perspective; there is deliberately no timeout, since killing a long
    /// run would lose it.
    async fn train(&self, request: &TrainRequest) -> TrainingResult<()>;

    /// Convert a checkpoint into `format`, returning the artifact path the
    /// converter produced.
    async fn export(
        &self,
        checkpoint: &Path,
        format: ExportFormat,
        img_size: u32,
    ) -> TrainingResult<PathBuf>;
}

/// [`DetectionTrainer`] shelling out to the Ultralytics `yolo` CLI.
#[derive(Debug, Clone)]
pub struct YoloCommandTrainer {
    program: String,
}

impl YoloCommandTrainer {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }

    async fn run_command(&self, args: Vec<String>) -> TrainingResult<()> {
        let rendered = format!("{} {}", self.program, args.join(" "));
        info!(command = %rendered, "invoking trainer");

        // stdio is inherited so the trainer's progress output stays visible.
        let status = Command::new(&self.program).args(&args).status().await.map_err(|e| {
            TrainingError::ExternalTool { command: rendered.clone(), status: e.to_string() }
        })?;

        if !status.success() {
            return Err(TrainingError::ExternalTool {
                command: rendered,
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DetectionTrainer for YoloCommandTrainer {
    fn id(&self) -> &'static str {
        "yolo-cli"
    }

    async fn train(&self, request: &TrainRequest) -> TrainingResult<()> {
        // The CLI wants project/name, not a single run dir.
        let project = request.run_dir.parent().ok_or_else(|| {
            TrainingError::Config(format!(
                "run dir has no parent: {}",
                request.run_dir.display()
            ))
        })?;
        let name = request.run_dir.file_name().ok_or_else(|| {
            TrainingError::Config(format!("run dir has no name: {}", request.run_dir.display()))
        })?;

        let mut args = vec![
            "detect".to_string(),
            "train".to_string(),
            format!("data={}", request.data_config.display()),
            format!("model={}", request.checkpoint.display()),
            format!("epochs={}", request.epochs),
            format!("batch={}", request.batch_size),
            format!("imgsz={}", request.img_size),
            format!("patience={}", request.patience),
            format!("project={}", project.display()),
            format!("name={}", name.to_string_lossy()),
            "exist_ok=True".to_string(),
        ];
        if let Some(device) = &request.device {
            args.push(format!("device={device}"));
        }

        self.run_command(args).await
    }

    async fn export(
        &self,
        checkpoint: &Path,
        format: ExportFormat,
        img_size: u32,
    ) -> TrainingResult<PathBuf> {
        let args = vec![
            "export".to_string(),
            format!("model={}", checkpoint.display()),
            format!("format={}", format.as_str()),
            format!("imgsz={img_size}"),
        ];
        self.run_command(args).await?;

        // Ultralytics writes the artifact next to the checkpoint.
        let artifact = checkpoint.with_extension(format.extension());
        if !artifact.exists() {
            return Err(TrainingError::ExternalTool {
                command: format!("{} export", self.program),
                status: format!("reported success but produced no {}", artifact.display()),
            });
        }
        Ok(artifact)
    }
}
