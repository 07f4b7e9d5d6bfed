use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_trees::DecisionTree;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::models::classifier_trait::ClassifierModel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_weight_leaf: f32,
    /// Weight samples inversely to their class frequency.
    pub balanced: bool,
}

/// CART decision tree (Gini impurity) backed by linfa-trees.
#[derive(Serialize, Deserialize)]
pub struct TreeClassifier {
    params: TreeParams,
    model: Option<DecisionTree<f64, usize>>,
}

impl TreeClassifier {
    pub fn new(params: TreeParams) -> Self {
        TreeClassifier {
            params,
            model: None,
        }
    }

    pub fn params(&self) -> &TreeParams {
        &self.params
    }
}

/// `n / (2 * n_class)` per sample, or 1.0 everywhere when not balancing.
fn sample_weights(y: &Array1<usize>, balanced: bool) -> Array1<f32> {
    if !balanced {
        return Array1::from_elem(y.len(), 1.0);
    }
    let n = y.len() as f32;
    let n_pos = y.iter().filter(|&&l| l == 1).count() as f32;
    let n_neg = n - n_pos;
    y.mapv(|l| {
        let count = if l == 1 { n_pos } else { n_neg };
        n / (2.0 * count)
    })
}

impl ClassifierModel for TreeClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        if self.params.max_depth == 0 {
            return Err(PipelineError::TrainingFailure(
                "decision tree: max_depth must be at least 1".to_string(),
            ));
        }
        let dataset = Dataset::new(x.to_owned(), y.to_owned())
            .with_weights(sample_weights(y, self.params.balanced));
        let model = DecisionTree::<f64, usize>::params()
            .max_depth(Some(self.params.max_depth))
            .min_weight_leaf(self.params.min_weight_leaf)
            .fit(&dataset)
            .map_err(|e| PipelineError::TrainingFailure(format!("decision tree: {}", e)))?;
        self.model = Some(model);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let model = self.model.as_ref().ok_or_else(|| {
            PipelineError::TrainingFailure("decision tree: model is not fitted".to_string())
        })?;
        let labels: Array1<usize> = model.predict(x);
        Ok(labels)
    }

    fn name(&self) -> &str {
        "decision_tree"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_weights_sum_to_n() {
        let y = Array1::from_vec(vec![0, 0, 0, 1]);
        let w = sample_weights(&y, true);
        assert!((w.sum() - 4.0).abs() < 1e-6);
        assert!(w[3] > w[0]);
    }

    #[test]
    fn fits_a_threshold() {
        let x = Array2::from_shape_vec((6, 1), vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0]).unwrap();
        let y = Array1::from_vec(vec![0, 0, 0, 1, 1, 1]);
        let mut classifier = TreeClassifier::new(TreeParams {
            max_depth: 2,
            min_weight_leaf: 1.0,
            balanced: false,
        });
        classifier.fit(&x, &y).unwrap();
        assert_eq!(classifier.predict(&x).unwrap(), y);
    }
}
