//! Scoring one applicant with the persisted preprocessor and model.
use std::path::Path;

use crate::artifact::{load_artifact, ArtifactKind, RunId};
use crate::config::ModelType;
use crate::data_handling::{ApplicantRecord, Decision};
use crate::error::{PipelineError, Result};
use crate::model_selection::ModelArtifact;
use crate::models::ClassifierModel;
use crate::preprocessing::Preprocessor;

/// An immutable pair of artifacts from one training run. Safe to share
/// between threads; `predict` never mutates it.
pub struct Predictor {
    run_id: RunId,
    preprocessor: Preprocessor,
    model: ModelArtifact,
}

impl Predictor {
    pub fn load(preprocessor_path: &Path, model_path: &Path) -> Result<Self> {
        let preprocessor =
            load_artifact::<Preprocessor>(preprocessor_path, ArtifactKind::Preprocessor)?;
        let model = load_artifact::<ModelArtifact>(model_path, ArtifactKind::Model)?;

        if preprocessor.run_id != model.run_id {
            return Err(PipelineError::IncompatibleArtifacts(format!(
                "preprocessor is from run {} but model is from run {}",
                preprocessor.run_id, model.run_id
            )));
        }
        log::info!(
            "Loaded {} model from run {} (cv F1 {:.4})",
            model.payload.family,
            model.run_id,
            model.payload.cv_f1
        );

        Ok(Self {
            run_id: model.run_id,
            preprocessor: preprocessor.payload,
            model: model.payload,
        })
    }

    /// Raw model label: 1 for an expected default.
    pub fn predict_label(&self, record: &ApplicantRecord) -> Result<usize> {
        let record = record.clone().validated()?;
        let x = self.preprocessor.transform(std::slice::from_ref(&record))?;
        let labels = self.model.classifier.predict(&x)?;
        labels.first().copied().ok_or_else(|| {
            PipelineError::TransformFailure("model returned no prediction".to_string())
        })
    }

    pub fn predict(&self, record: &ApplicantRecord) -> Result<Decision> {
        let label = self.predict_label(record)?;
        log::debug!("Predicted label {} for {:?}", label, record);
        Ok(Decision::from_label(label))
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn model_type(&self) -> &ModelType {
        &self.model.model_type
    }

    pub fn cv_f1(&self) -> f64 {
        self.model.cv_f1
    }
}
