use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::config::ModelType;
use crate::error::Result;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::gbdt::{GBDTClassifier, GbdtParams};
use crate::models::logistic::{LogisticClassifier, LogisticParams};
use crate::models::tree::{TreeClassifier, TreeParams};

/// A classifier of any supported family. This is what the model artifact
/// stores, so the family travels with the fitted parameters.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classifier {
    LogisticRegression(LogisticClassifier),
    GradientBoosting(GBDTClassifier),
    DecisionTree(TreeClassifier),
}

impl Classifier {
    /// The hyper-parameters this classifier was built from.
    pub fn model_type(&self) -> ModelType {
        match self {
            Classifier::LogisticRegression(m) => {
                let p = m.params();
                ModelType::LogisticRegression {
                    c: p.c,
                    max_iterations: p.max_iterations,
                }
            }
            Classifier::GradientBoosting(m) => {
                let p = m.params();
                ModelType::GradientBoosting {
                    learning_rate: p.learning_rate,
                    num_boost_round: p.num_boost_round,
                    max_depth: p.max_depth,
                    subsample: p.subsample,
                    scale_pos_weight: p.scale_pos_weight,
                }
            }
            Classifier::DecisionTree(m) => {
                let p = m.params();
                ModelType::DecisionTree {
                    max_depth: p.max_depth,
                    min_weight_leaf: p.min_weight_leaf,
                    balanced: p.balanced,
                }
            }
        }
    }

    fn inner(&self) -> &dyn ClassifierModel {
        match self {
            Classifier::LogisticRegression(m) => m,
            Classifier::GradientBoosting(m) => m,
            Classifier::DecisionTree(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ClassifierModel {
        match self {
            Classifier::LogisticRegression(m) => m,
            Classifier::GradientBoosting(m) => m,
            Classifier::DecisionTree(m) => m,
        }
    }
}

impl ClassifierModel for Classifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        self.inner_mut().fit(x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        self.inner().predict(x)
    }

    fn name(&self) -> &str {
        self.inner().name()
    }
}

/// Build an unfitted classifier from a `ModelType`.
pub fn build_model(model_type: &ModelType) -> Classifier {
    match *model_type {
        ModelType::LogisticRegression { c, max_iterations } => {
            Classifier::LogisticRegression(LogisticClassifier::new(LogisticParams {
                c,
                max_iterations,
            }))
        }
        ModelType::GradientBoosting {
            learning_rate,
            num_boost_round,
            max_depth,
            subsample,
            scale_pos_weight,
        } => Classifier::GradientBoosting(GBDTClassifier::new(GbdtParams {
            learning_rate,
            num_boost_round,
            max_depth,
            subsample,
            scale_pos_weight,
        })),
        ModelType::DecisionTree {
            max_depth,
            min_weight_leaf,
            balanced,
        } => Classifier::DecisionTree(TreeClassifier::new(TreeParams {
            max_depth,
            min_weight_leaf,
            balanced,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn build_model_round_trips_the_model_type() {
        for name in ["logistic_regression", "gradient_boosting", "decision_tree"] {
            let mt = ModelType::from_str(name).unwrap();
            let model = build_model(&mt);
            assert_eq!(model.name(), name);
            assert_eq!(model.model_type(), mt);
        }
    }
}
