use std::path::PathBuf;

use thiserror::Error;

/// Failures raised anywhere in the training pipeline or the predictor.
///
/// Every variant carries enough context to tell the caller which stage and
/// which input failed; nothing is retried.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("artifact not found: {}", .0.display())]
    ArtifactMissing(PathBuf),

    #[error("incompatible artifacts: {0}")]
    IncompatibleArtifacts(String),

    #[error("transform failure: {0}")]
    TransformFailure(String),

    #[error("training failure: {0}")]
    TrainingFailure(String),

    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("serialization error for {}: {source}", path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        PipelineError::Csv {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
