use std::path::PathBuf;

use thiserror::Error;

use crate::version::VersionId;

pub type TrainingResult<T> = std::result::Result<T, TrainingError>;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("invalid pipeline config: {0}")]
    Config(String),

    #[error("version manifest {path} is corrupt: {source}")]
    CorruptManifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown version: {0}")]
    VersionNotFound(VersionId),

    #[error("checkpoint missing: {}", .0.display())]
    CheckpointMissing(PathBuf),

    #[error("no trained versions yet")]
    NoVersions,

    #[error("need at least 2 versions to compare, have {have}")]
    InsufficientHistory { have: usize },

    #[error("external tool failed: `{command}` ({status})")]
    ExternalTool { command: String, status: String },

    #[error(transparent)]
    Dataset(#[from] anneal_dataset::DatasetError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
