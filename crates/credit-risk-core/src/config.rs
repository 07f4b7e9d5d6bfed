use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Central configuration for a training run and for the artifacts it writes.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    pub experiment_name: String,
    pub paths: PathsConfig,
    pub split: SplitConfig,
    pub selection: SelectionConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            experiment_name: "Credit_Risk_Model_Training".to_string(),
            paths: PathsConfig::default(),
            split: SplitConfig::default(),
            selection: SelectionConfig::default(),
        }
    }
}

/// Where every stage reads from and writes to, relative to the working directory.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct PathsConfig {
    pub raw_data: PathBuf,
    pub train_data: PathBuf,
    pub test_data: PathBuf,
    pub preprocessor: PathBuf,
    pub model: PathBuf,
    pub experiment_log: PathBuf,
    pub report: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let artifacts = PathBuf::from("artifacts");
        Self {
            raw_data: artifacts
                .join("data")
                .join("interim")
                .join("credit_risk_dataset_clean.csv"),
            train_data: artifacts.join("data").join("processed").join("train.csv"),
            test_data: artifacts.join("data").join("processed").join("test.csv"),
            preprocessor: artifacts.join("models").join("preprocessor.json"),
            model: artifacts.join("models").join("model.json"),
            experiment_log: artifacts.join("experiments").join("runs.jsonl"),
            report: Some(artifacts.join("reports").join("training_report.html")),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct SplitConfig {
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct SelectionConfig {
    pub cv_folds: usize,
    pub smote_k_neighbors: usize,
    pub seed: u64,
    pub grids: Vec<FamilyGrid>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            cv_folds: 3,
            smote_k_neighbors: 5,
            seed: 42,
            grids: vec![
                FamilyGrid::default_for("logistic_regression"),
                FamilyGrid::default_for("gradient_boosting"),
                FamilyGrid::default_for("decision_tree"),
            ],
        }
    }
}

/// Supported model families and the hyper-parameters of one candidate.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    LogisticRegression {
        /// Inverse regularization strength; the L2 penalty is `1 / c`.
        c: f64,
        max_iterations: u64,
    },
    GradientBoosting {
        learning_rate: f32,
        num_boost_round: u32,
        max_depth: u32,
        subsample: f64,
        /// Sample weight applied to the positive (default) class.
        scale_pos_weight: f32,
    },
    DecisionTree {
        max_depth: usize,
        min_weight_leaf: f32,
        /// Weight samples inversely to their class frequency.
        balanced: bool,
    },
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::GradientBoosting {
            learning_rate: 0.1,
            num_boost_round: 100,
            max_depth: 5,
            subsample: 1.0,
            scale_pos_weight: 1.0,
        }
    }
}

impl ModelType {
    pub fn family(&self) -> &'static str {
        match self {
            ModelType::LogisticRegression { .. } => "logistic_regression",
            ModelType::GradientBoosting { .. } => "gradient_boosting",
            ModelType::DecisionTree { .. } => "decision_tree",
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "logistic_regression" | "logistic" => Ok(ModelType::LogisticRegression {
                c: 1.0,
                max_iterations: 1000,
            }),
            "gradient_boosting" | "gbdt" => Ok(ModelType::default()),
            "decision_tree" | "tree" => Ok(ModelType::DecisionTree {
                max_depth: 10,
                min_weight_leaf: 1.0,
                balanced: false,
            }),
            _ => Err(format!(
                "Unknown model type: {}. Valid options are: logistic_regression, gradient_boosting, decision_tree",
                s
            )),
        }
    }
}

/// Hyper-parameter grid for one model family. Every combination of the
/// listed values becomes one candidate.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FamilyGrid {
    LogisticRegression {
        c: Vec<f64>,
        max_iterations: Vec<u64>,
    },
    GradientBoosting {
        learning_rate: Vec<f32>,
        num_boost_round: Vec<u32>,
        max_depth: Vec<u32>,
        subsample: Vec<f64>,
        scale_pos_weight: Vec<f32>,
    },
    DecisionTree {
        max_depth: Vec<usize>,
        min_weight_leaf: Vec<f32>,
        balanced: Vec<bool>,
    },
}

impl FamilyGrid {
    /// The default search space for a family name; unknown names fall back
    /// to the gradient boosting grid.
    pub fn default_for(family: &str) -> Self {
        match family {
            "logistic_regression" => FamilyGrid::LogisticRegression {
                c: vec![0.1, 1.0, 10.0],
                max_iterations: vec![100, 1000],
            },
            "decision_tree" => FamilyGrid::DecisionTree {
                max_depth: vec![5, 10, 15],
                min_weight_leaf: vec![1.0, 5.0],
                balanced: vec![false, true],
            },
            _ => FamilyGrid::GradientBoosting {
                learning_rate: vec![0.01, 0.1],
                num_boost_round: vec![100, 200],
                max_depth: vec![3, 5, 7],
                subsample: vec![0.8, 1.0],
                scale_pos_weight: vec![1.0, 3.0],
            },
        }
    }

    pub fn family(&self) -> &'static str {
        match self {
            FamilyGrid::LogisticRegression { .. } => "logistic_regression",
            FamilyGrid::GradientBoosting { .. } => "gradient_boosting",
            FamilyGrid::DecisionTree { .. } => "decision_tree",
        }
    }

    /// Expand the grid into concrete candidates. The last listed parameter
    /// varies fastest.
    pub fn candidates(&self) -> Vec<ModelType> {
        match self {
            FamilyGrid::LogisticRegression { c, max_iterations } => c
                .iter()
                .flat_map(|&c| {
                    max_iterations
                        .iter()
                        .map(move |&max_iterations| ModelType::LogisticRegression { c, max_iterations })
                })
                .collect(),
            FamilyGrid::GradientBoosting {
                learning_rate,
                num_boost_round,
                max_depth,
                subsample,
                scale_pos_weight,
            } => {
                let mut out = Vec::new();
                for &learning_rate in learning_rate {
                    for &num_boost_round in num_boost_round {
                        for &max_depth in max_depth {
                            for &subsample in subsample {
                                for &scale_pos_weight in scale_pos_weight {
                                    out.push(ModelType::GradientBoosting {
                                        learning_rate,
                                        num_boost_round,
                                        max_depth,
                                        subsample,
                                        scale_pos_weight,
                                    });
                                }
                            }
                        }
                    }
                }
                out
            }
            FamilyGrid::DecisionTree {
                max_depth,
                min_weight_leaf,
                balanced,
            } => {
                let mut out = Vec::new();
                for &max_depth in max_depth {
                    for &min_weight_leaf in min_weight_leaf {
                        for &balanced in balanced {
                            out.push(ModelType::DecisionTree {
                                max_depth,
                                min_weight_leaf,
                                balanced,
                            });
                        }
                    }
                }
                out
            }
        }
    }
}
