//! Versioned envelopes for the persisted preprocessor and model.
//!
//! Both artifacts of one training run carry the same `RunId`; the predictor
//! refuses to pair artifacts from different runs.
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Preprocessor,
    Model,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Preprocessor => write!(f, "preprocessor"),
            ArtifactKind::Model => write!(f, "model"),
        }
    }
}

/// Identifier shared by every artifact written in one training run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// `<UTC timestamp>-<8 random hex digits>`
    pub fn generate() -> Self {
        let suffix: u32 = rand::thread_rng().gen();
        RunId(format!(
            "{}-{:08x}",
            Utc::now().format("%Y%m%dT%H%M%SZ"),
            suffix
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RunId {
    fn from(s: &str) -> Self {
        RunId(s.to_string())
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact<T> {
    pub kind: ArtifactKind,
    pub run_id: RunId,
    pub created_at: DateTime<Utc>,
    pub producer: String,
    pub payload: T,
}

impl<T> Artifact<T> {
    pub fn new(kind: ArtifactKind, run_id: RunId, payload: T) -> Self {
        Self {
            kind,
            run_id,
            created_at: Utc::now(),
            producer: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            payload,
        }
    }
}

/// Write an artifact as JSON, creating parent directories as needed.
pub fn save_artifact<T: Serialize>(path: &Path, artifact: &Artifact<T>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, artifact).map_err(|source| {
        PipelineError::Serialization {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.flush().map_err(|e| PipelineError::io(path, e))?;
    log::debug!("Saved {} artifact to {}", artifact.kind, path.display());
    Ok(())
}

/// Read an artifact and check its kind before decoding the payload. A missing
/// file is `ArtifactMissing`.
pub fn load_artifact<T: DeserializeOwned>(path: &Path, expected: ArtifactKind) -> Result<Artifact<T>> {
    if !path.is_file() {
        return Err(PipelineError::ArtifactMissing(path.to_path_buf()));
    }
    let serialization = |source: serde_json::Error| PipelineError::Serialization {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let raw: Artifact<serde_json::Value> =
        serde_json::from_reader(BufReader::new(file)).map_err(serialization)?;
    if raw.kind != expected {
        return Err(PipelineError::IncompatibleArtifacts(format!(
            "{} holds a {} artifact, expected {}",
            path.display(),
            raw.kind,
            expected
        )));
    }
    Ok(Artifact {
        kind: raw.kind,
        run_id: raw.run_id,
        created_at: raw.created_at,
        producer: raw.producer,
        payload: serde_json::from_value(raw.payload).map_err(serialization)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_ids_are_unique() {
        assert_ne!(RunId::generate(), RunId::generate());
    }

    #[test]
    fn save_then_load_checks_kind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("a.json");
        let artifact = Artifact::new(ArtifactKind::Model, RunId::from("run-1"), vec![1u8, 2, 3]);
        save_artifact(&path, &artifact).unwrap();

        let loaded: Artifact<Vec<u8>> = load_artifact(&path, ArtifactKind::Model).unwrap();
        assert_eq!(loaded.payload, vec![1, 2, 3]);
        assert_eq!(loaded.run_id.as_str(), "run-1");

        let err = load_artifact::<Vec<u8>>(&path, ArtifactKind::Preprocessor).unwrap_err();
        assert!(matches!(err, PipelineError::IncompatibleArtifacts(_)));
    }

    #[test]
    fn missing_file_is_artifact_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_artifact::<u8>(&dir.path().join("nope.json"), ArtifactKind::Model)
            .unwrap_err();
        assert!(matches!(err, PipelineError::ArtifactMissing(_)));
        assert!(err.to_string().starts_with("artifact not found"));
    }
}
