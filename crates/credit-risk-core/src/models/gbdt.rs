use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::models::classifier_trait::ClassifierModel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbdtParams {
    pub learning_rate: f32,
    pub num_boost_round: u32,
    pub max_depth: u32,
    /// Fraction of rows sampled per boosting round.
    pub subsample: f64,
    pub scale_pos_weight: f32,
}

/// Gradient Boosting Decision Tree (GBDT) classifier with log-likelihood loss.
#[derive(Serialize, Deserialize)]
pub struct GBDTClassifier {
    params: GbdtParams,
    model: Option<GBDT>,
}

impl GBDTClassifier {
    pub fn new(params: GbdtParams) -> Self {
        GBDTClassifier {
            params,
            model: None,
        }
    }

    pub fn params(&self) -> &GbdtParams {
        &self.params
    }

    fn config(&self, feature_size: usize) -> Config {
        let mut config = Config::new();
        config.set_feature_size(feature_size);
        config.set_shrinkage(self.params.learning_rate);
        config.set_max_depth(self.params.max_depth);
        config.set_iterations(self.params.num_boost_round as usize);
        config.set_data_sample_ratio(self.params.subsample);
        config.set_training_optimization_level(2);
        config.set_debug(false);
        config.set_loss("LogLikelyhood");
        config
    }
}

/// gbdt works on f32 rows with labels in {-1, 1}.
fn to_data_vec(x: &Array2<f64>, y: Option<&Array1<usize>>, pos_weight: f32) -> DataVec {
    let mut data = DataVec::with_capacity(x.nrows());
    for (i, row) in x.rows().into_iter().enumerate() {
        let features: Vec<f32> = row.iter().map(|&v| v as f32).collect();
        let (label, weight) = match y.map(|y| y[i]) {
            Some(1) => (1.0, pos_weight),
            Some(_) => (-1.0, 1.0),
            None => (0.0, 1.0),
        };
        data.push(Data::new_training_data(features, weight, label, None));
    }
    data
}

impl ClassifierModel for GBDTClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        if x.nrows() == 0 || x.nrows() != y.len() {
            return Err(PipelineError::TrainingFailure(format!(
                "gbdt: cannot fit {} rows against {} labels",
                x.nrows(),
                y.len()
            )));
        }
        if self.params.num_boost_round == 0 {
            return Err(PipelineError::TrainingFailure(
                "gbdt: num_boost_round must be at least 1".to_string(),
            ));
        }
        if !(self.params.subsample > 0.0 && self.params.subsample <= 1.0) {
            return Err(PipelineError::TrainingFailure(format!(
                "gbdt: subsample must be in (0, 1], got {}",
                self.params.subsample
            )));
        }

        let mut gbdt = GBDT::new(&self.config(x.ncols()));
        let mut train = to_data_vec(x, Some(y), self.params.scale_pos_weight);
        gbdt.fit(&mut train);
        self.model = Some(gbdt);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| PipelineError::TrainingFailure("gbdt: model is not fitted".to_string()))?;
        // With LogLikelyhood loss `predict` yields a probability of the positive class.
        let probabilities = model.predict(&to_data_vec(x, None, 1.0));
        Ok(probabilities
            .into_iter()
            .map(|p| usize::from(p > 0.5))
            .collect())
    }

    fn name(&self) -> &str {
        "gradient_boosting"
    }
}
