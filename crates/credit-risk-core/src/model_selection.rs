//! Cross-validated grid search across model families.
//!
//! Every fold is oversampled once (SMOTE on the training part only) and the
//! same prepared folds are shared by all candidates. Candidates are scored
//! in parallel, but results are reduced in enumeration order, so the winner
//! for a given seed never depends on thread scheduling.
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::artifact::{save_artifact, Artifact, ArtifactKind, RunId};
use crate::config::{ModelType, SelectionConfig};
use crate::data_handling::FeatureSet;
use crate::error::{PipelineError, Result};
use crate::models::{build_model, Classifier, ClassifierModel};
use crate::resampling::Smote;
use crate::stats::{f1_score, mean};

/// Stratified k-fold splitter for binary labels.
#[derive(Debug, Clone)]
pub struct StratifiedKFold {
    pub n_splits: usize,
    pub seed: u64,
}

impl StratifiedKFold {
    pub fn new(n_splits: usize, seed: u64) -> Self {
        Self { n_splits, seed }
    }

    /// Return `(train_indices, validation_indices)` per fold, both sorted.
    pub fn split(&self, y: &Array1<usize>) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
        let k = self.n_splits;
        if k < 2 {
            return Err(PipelineError::InvalidInput(format!(
                "cv_folds must be at least 2, got {}",
                k
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut fold_of = vec![0usize; y.len()];
        for class in [0usize, 1] {
            let mut members: Vec<usize> = (0..y.len()).filter(|&i| y[i] == class).collect();
            if members.len() < k {
                return Err(PipelineError::InvalidInput(format!(
                    "class {} has {} rows, fewer than cv_folds = {}",
                    class,
                    members.len(),
                    k
                )));
            }
            members.shuffle(&mut rng);
            for (pos, &i) in members.iter().enumerate() {
                fold_of[i] = pos % k;
            }
        }

        Ok((0..k)
            .map(|j| {
                let (validation, train): (Vec<usize>, Vec<usize>) =
                    (0..y.len()).partition(|&i| fold_of[i] == j);
                (train, validation)
            })
            .collect())
    }
}

/// One fold with its training part already oversampled.
struct PreparedFold {
    x_train: Array2<f64>,
    y_train: Array1<usize>,
    x_val: Array2<f64>,
    y_val: Array1<usize>,
}

/// Cross-validation outcome of one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub model_type: ModelType,
    pub fold_f1: Vec<f64>,
    /// `None` when the candidate failed to fit on some fold.
    pub mean_f1: Option<f64>,
    pub error: Option<String>,
}

/// Best candidate of one family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilySearchResult {
    pub family: String,
    pub n_candidates: usize,
    pub n_failed: usize,
    pub best: Option<CandidateScore>,
}

/// Payload of the model artifact.
#[derive(Serialize, Deserialize)]
pub struct ModelArtifact {
    pub family: String,
    pub model_type: ModelType,
    pub cv_f1: f64,
    pub test_f1: f64,
    pub classifier: Classifier,
}

/// What a finished selection reports back to the pipeline.
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    pub families: Vec<FamilySearchResult>,
    pub winner: ModelType,
    pub cv_f1: f64,
    pub test_f1: f64,
    pub model_path: PathBuf,
}

/// Score every candidate of every grid. The output holds one entry per grid,
/// in grid order.
pub fn grid_search(
    config: &SelectionConfig,
    train: &FeatureSet,
) -> Result<Vec<(String, Vec<CandidateScore>)>> {
    if config.grids.is_empty() {
        return Err(PipelineError::InvalidInput(
            "no model families configured for selection".to_string(),
        ));
    }

    let folds = prepare_folds(config, train)?;

    let candidates: Vec<(usize, ModelType)> = config
        .grids
        .iter()
        .enumerate()
        .flat_map(|(g, grid)| grid.candidates().into_iter().map(move |c| (g, c)))
        .collect();
    log::info!(
        "Grid search: {} candidates across {} families, {} folds",
        candidates.len(),
        config.grids.len(),
        folds.len()
    );

    let scores: Vec<(usize, CandidateScore)> = candidates
        .into_par_iter()
        .map(|(g, model_type)| (g, evaluate_candidate(&model_type, &folds)))
        .collect();

    let mut per_family: Vec<(String, Vec<CandidateScore>)> = config
        .grids
        .iter()
        .map(|grid| (grid.family().to_string(), Vec::new()))
        .collect();
    for (g, score) in scores {
        per_family[g].1.push(score);
    }
    Ok(per_family)
}

fn prepare_folds(config: &SelectionConfig, train: &FeatureSet) -> Result<Vec<PreparedFold>> {
    let splits = StratifiedKFold::new(config.cv_folds, config.seed).split(&train.y)?;
    splits
        .into_iter()
        .enumerate()
        .map(|(j, (train_idx, val_idx))| {
            let x_fold = train.x.select(Axis(0), &train_idx);
            let y_fold = train.y.select(Axis(0), &train_idx);
            let smote = Smote::new(config.smote_k_neighbors, config.seed.wrapping_add(j as u64));
            let (x_train, y_train) = smote.fit_resample(&x_fold, &y_fold)?;
            log::debug!(
                "Fold {}: {} train rows after SMOTE, {} validation rows",
                j,
                x_train.nrows(),
                val_idx.len()
            );
            Ok(PreparedFold {
                x_train,
                y_train,
                x_val: train.x.select(Axis(0), &val_idx),
                y_val: train.y.select(Axis(0), &val_idx),
            })
        })
        .collect()
}

fn evaluate_candidate(model_type: &ModelType, folds: &[PreparedFold]) -> CandidateScore {
    let fold_f1: Result<Vec<f64>> = folds
        .par_iter()
        .map(|fold| {
            let mut model = build_model(model_type);
            model.fit(&fold.x_train, &fold.y_train)?;
            let predicted = model.predict(&fold.x_val)?;
            Ok(f1_score(&fold.y_val.to_vec(), &predicted.to_vec()))
        })
        .collect();

    match fold_f1 {
        Ok(fold_f1) => {
            let mean_f1 = mean(&fold_f1);
            log::trace!("{:?}: mean F1 {:?}", model_type, mean_f1);
            CandidateScore {
                model_type: model_type.clone(),
                fold_f1,
                mean_f1,
                error: None,
            }
        }
        Err(e) => {
            log::warn!("Candidate {:?} failed: {}", model_type, e);
            CandidateScore {
                model_type: model_type.clone(),
                fold_f1: Vec::new(),
                mean_f1: None,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Highest mean F1 wins; on a tie the first one enumerated is kept.
fn best_of<'a, I>(scores: I) -> Option<&'a CandidateScore>
where
    I: IntoIterator<Item = &'a CandidateScore>,
{
    let mut best: Option<(&CandidateScore, f64)> = None;
    for score in scores {
        if let Some(f1) = score.mean_f1 {
            if best.map_or(true, |(_, b)| f1 > b) {
                best = Some((score, f1));
            }
        }
    }
    best.map(|(s, _)| s)
}

/// Runs the search, refits the winner on the whole oversampled training set,
/// scores it on the test partition and persists it.
pub struct ModelTrainer {
    config: SelectionConfig,
    model_path: PathBuf,
}

impl ModelTrainer {
    pub fn new(config: &SelectionConfig, model_path: &Path) -> Self {
        Self {
            config: config.clone(),
            model_path: model_path.to_path_buf(),
        }
    }

    pub fn run(&self, train: &FeatureSet, test: &FeatureSet, run_id: &RunId) -> Result<SelectionOutcome> {
        log::info!(
            "Starting model selection on {} rows x {} features",
            train.n_rows(),
            train.n_features()
        );
        let per_family = grid_search(&self.config, train)?;

        let families: Vec<FamilySearchResult> = per_family
            .iter()
            .map(|(family, scores)| {
                let best = best_of(scores).cloned();
                match &best {
                    Some(b) => log::info!(
                        "{} best F1 {:.4} with {:?}",
                        family,
                        b.mean_f1.unwrap_or_default(),
                        b.model_type
                    ),
                    None => log::warn!("{}: every candidate failed", family),
                }
                FamilySearchResult {
                    family: family.clone(),
                    n_candidates: scores.len(),
                    n_failed: scores.iter().filter(|s| s.mean_f1.is_none()).count(),
                    best,
                }
            })
            .collect();

        let winner = best_of(families.iter().filter_map(|f| f.best.as_ref()))
            .cloned()
            .ok_or_else(|| {
                PipelineError::TrainingFailure("every model candidate failed to fit".to_string())
            })?;
        let cv_f1 = winner.mean_f1.unwrap_or_default();
        log::info!(
            "Selected {} with cross-validated F1 {:.4}: {:?}",
            winner.model_type.family(),
            cv_f1,
            winner.model_type
        );

        let smote = Smote::new(self.config.smote_k_neighbors, self.config.seed);
        let (x_full, y_full) = smote.fit_resample(&train.x, &train.y)?;
        let mut classifier = build_model(&winner.model_type);
        classifier.fit(&x_full, &y_full)?;

        let predicted = classifier.predict(&test.x)?;
        let test_f1 = f1_score(&test.y.to_vec(), &predicted.to_vec());
        log::info!("Test F1 of the refit model: {:.4}", test_f1);

        let artifact = Artifact::new(
            ArtifactKind::Model,
            run_id.clone(),
            ModelArtifact {
                family: winner.model_type.family().to_string(),
                model_type: winner.model_type.clone(),
                cv_f1,
                test_f1,
                classifier,
            },
        );
        save_artifact(&self.model_path, &artifact)?;
        log::info!("Model saved to {}", self.model_path.display());

        Ok(SelectionOutcome {
            families,
            winner: winner.model_type,
            cv_f1,
            test_f1,
            model_path: self.model_path.clone(),
        })
    }
}
