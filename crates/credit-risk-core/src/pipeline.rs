//! The batch training pipeline: ingestion, transformation, model selection,
//! then the non-fatal bookkeeping (experiment log and report).
use std::path::PathBuf;
use std::time::Instant;

use crate::artifact::{save_artifact, Artifact, ArtifactKind, RunId};
use crate::config::{PathsConfig, PipelineConfig};
use crate::data_handling::FeatureSet;
use crate::error::Result;
use crate::ingestion::DataIngestion;
use crate::io::read_labeled_dataset;
use crate::model_selection::{ModelTrainer, SelectionOutcome};
use crate::preprocessing::Preprocessor;
use crate::report::training_report;
use crate::tracking::{ExperimentTracker, RunRecord};

/// Feature matrices produced by the transformation stage.
#[derive(Debug, Clone)]
pub struct TransformationOutput {
    pub train: FeatureSet,
    pub test: FeatureSet,
    pub feature_names: Vec<String>,
    pub preprocessor_path: PathBuf,
}

/// Fits the preprocessor on the train split, applies it to both splits and
/// persists it.
pub struct DataTransformation {
    paths: PathsConfig,
}

impl DataTransformation {
    pub fn new(paths: &PathsConfig) -> Self {
        Self {
            paths: paths.clone(),
        }
    }

    pub fn run(&self, run_id: &RunId) -> Result<TransformationOutput> {
        log::info!("Starting data transformation");
        let train = read_labeled_dataset(&self.paths.train_data)?;
        let test = read_labeled_dataset(&self.paths.test_data)?;
        train.log_summary("Train");
        test.log_summary("Test");

        let (preprocessor, x_train) = Preprocessor::fit_transform(&train.records)?;
        let x_test = preprocessor.transform(&test.records)?;
        let feature_names = preprocessor.feature_names();
        log::debug!("Features: {:?}", feature_names);

        save_artifact(
            &self.paths.preprocessor,
            &Artifact::new(ArtifactKind::Preprocessor, run_id.clone(), &preprocessor),
        )?;
        log::info!(
            "Preprocessor saved to {} ({} features)",
            self.paths.preprocessor.display(),
            feature_names.len()
        );

        Ok(TransformationOutput {
            train: FeatureSet::new(x_train, train.labels)?,
            test: FeatureSet::new(x_test, test.labels)?,
            feature_names,
            preprocessor_path: self.paths.preprocessor.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub run_id: RunId,
    pub outcome: SelectionOutcome,
    pub preprocessor_path: PathBuf,
}

impl TrainingSummary {
    /// The cross-validated F1 of the selected model.
    pub fn f1_score(&self) -> f64 {
        self.outcome.cv_f1
    }
}

pub struct TrainPipeline {
    config: PipelineConfig,
}

impl TrainPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<TrainingSummary> {
        let start = Instant::now();
        let run_id = RunId::generate();
        log::info!(
            "Training run {} of experiment '{}'",
            run_id,
            self.config.experiment_name
        );

        DataIngestion::new(&self.config.paths, &self.config.split).run()?;
        let transformed = DataTransformation::new(&self.config.paths).run(&run_id)?;
        let outcome = ModelTrainer::new(&self.config.selection, &self.config.paths.model).run(
            &transformed.train,
            &transformed.test,
            &run_id,
        )?;

        // The model is already on disk; nothing below can fail the run.
        let record = RunRecord::new(&self.config.experiment_name, &run_id, &outcome);
        if let Err(e) = ExperimentTracker::new(&self.config.paths.experiment_log).log_run(&record) {
            log::warn!("Experiment tracking failed: {}", e);
        }
        if let Some(report_path) = &self.config.paths.report {
            match training_report(&record, &self.config)
                .and_then(|report| report.save_to_file(report_path))
            {
                Ok(()) => log::info!("Training report written to {}", report_path.display()),
                Err(e) => log::warn!("Could not write training report: {}", e),
            }
        }

        log::info!("Training pipeline finished in {:?}", start.elapsed());
        Ok(TrainingSummary {
            run_id,
            outcome,
            preprocessor_path: transformed.preprocessor_path,
        })
    }
}
