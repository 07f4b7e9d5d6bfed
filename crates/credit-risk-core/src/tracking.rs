//! Local experiment tracking: one JSON line per training run.
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::artifact::RunId;
use crate::config::ModelType;
use crate::error::{PipelineError, Result};
use crate::model_selection::{FamilySearchResult, SelectionOutcome};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilySummary {
    pub family: String,
    pub best_f1: Option<f64>,
    pub best_params: Option<ModelType>,
    pub n_candidates: usize,
    pub n_failed: usize,
}

impl From<&FamilySearchResult> for FamilySummary {
    fn from(result: &FamilySearchResult) -> Self {
        Self {
            family: result.family.clone(),
            best_f1: result.best.as_ref().and_then(|b| b.mean_f1),
            best_params: result.best.as_ref().map(|b| b.model_type.clone()),
            n_candidates: result.n_candidates,
            n_failed: result.n_failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub experiment_name: String,
    pub run_id: RunId,
    pub timestamp: DateTime<Utc>,
    pub families: Vec<FamilySummary>,
    pub winner: ModelType,
    pub cv_f1: f64,
    pub test_f1: f64,
}

impl RunRecord {
    pub fn new(experiment_name: &str, run_id: &RunId, outcome: &SelectionOutcome) -> Self {
        Self {
            experiment_name: experiment_name.to_string(),
            run_id: run_id.clone(),
            timestamp: Utc::now(),
            families: outcome.families.iter().map(FamilySummary::from).collect(),
            winner: outcome.winner.clone(),
            cv_f1: outcome.cv_f1,
            test_f1: outcome.test_f1,
        }
    }
}

pub struct ExperimentTracker {
    path: PathBuf,
}

impl ExperimentTracker {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Append one record to the log, creating the file if needed.
    pub fn log_run(&self, record: &RunRecord) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }
        let line = serde_json::to_string(record).map_err(|source| PipelineError::Serialization {
            path: self.path.clone(),
            source,
        })?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| PipelineError::io(&self.path, e))?;
        writeln!(file, "{}", line).map_err(|e| PipelineError::io(&self.path, e))?;
        log::info!(
            "Logged run {} of experiment '{}' to {}",
            record.run_id,
            record.experiment_name,
            self.path.display()
        );
        Ok(())
    }

    /// Every record in the log, oldest first. Blank lines are skipped.
    pub fn runs(&self) -> Result<Vec<RunRecord>> {
        let file = File::open(&self.path).map_err(|e| PipelineError::io(&self.path, e))?;
        let mut runs = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| PipelineError::io(&self.path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            runs.push(serde_json::from_str(&line).map_err(|source| {
                PipelineError::Serialization {
                    path: self.path.clone(),
                    source,
                }
            })?);
        }
        Ok(runs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(run: &str, cv_f1: f64) -> RunRecord {
        RunRecord {
            experiment_name: "unit".to_string(),
            run_id: RunId::from(run),
            timestamp: Utc::now(),
            families: vec![FamilySummary {
                family: "gradient_boosting".to_string(),
                best_f1: Some(cv_f1),
                best_params: Some(ModelType::default()),
                n_candidates: 1,
                n_failed: 0,
            }],
            winner: ModelType::default(),
            cv_f1,
            test_f1: 0.5,
        }
    }

    #[test]
    fn appends_one_line_per_run() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = ExperimentTracker::new(&dir.path().join("exp").join("runs.jsonl"));
        tracker.log_run(&record("a", 0.6)).unwrap();
        tracker.log_run(&record("b", 0.7)).unwrap();

        let runs = tracker.runs().unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].run_id.as_str(), "a");
        assert_eq!(runs[1].cv_f1, 0.7);
    }
}
