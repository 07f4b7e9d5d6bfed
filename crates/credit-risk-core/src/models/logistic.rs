use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_logistic::{FittedLogisticRegression, LogisticRegression};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::models::classifier_trait::ClassifierModel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticParams {
    /// Inverse regularization strength.
    pub c: f64,
    pub max_iterations: u64,
}

/// L2-regularized logistic regression backed by linfa-logistic.
#[derive(Serialize, Deserialize)]
pub struct LogisticClassifier {
    params: LogisticParams,
    model: Option<FittedLogisticRegression<f64, usize>>,
}

impl LogisticClassifier {
    pub fn new(params: LogisticParams) -> Self {
        LogisticClassifier {
            params,
            model: None,
        }
    }

    pub fn params(&self) -> &LogisticParams {
        &self.params
    }
}

impl ClassifierModel for LogisticClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()> {
        if !(self.params.c > 0.0 && self.params.c.is_finite()) {
            return Err(PipelineError::TrainingFailure(format!(
                "logistic regression: C must be positive, got {}",
                self.params.c
            )));
        }
        let dataset = Dataset::new(x.to_owned(), y.to_owned());
        let model = LogisticRegression::default()
            .alpha(1.0 / self.params.c)
            .max_iterations(self.params.max_iterations)
            .fit(&dataset)
            .map_err(|e| PipelineError::TrainingFailure(format!("logistic regression: {}", e)))?;
        self.model = Some(model);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let model = self.model.as_ref().ok_or_else(|| {
            PipelineError::TrainingFailure("logistic regression: model is not fitted".to_string())
        })?;
        let labels: Array1<usize> = model.predict(x);
        Ok(labels)
    }

    fn name(&self) -> &str {
        "logistic_regression"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separates_a_linear_boundary() {
        let x = Array2::from_shape_vec(
            (8, 2),
            vec![
                -2.0, 0.1, -1.5, -0.2, -1.0, 0.3, -0.5, 0.0, 0.5, 0.2, 1.0, -0.1, 1.5, 0.0, 2.0,
                0.4,
            ],
        )
        .unwrap();
        let y = Array1::from_vec(vec![0, 0, 0, 0, 1, 1, 1, 1]);

        let mut classifier = LogisticClassifier::new(LogisticParams {
            c: 10.0,
            max_iterations: 200,
        });
        classifier.fit(&x, &y).unwrap();
        assert_eq!(classifier.predict(&x).unwrap(), y);
    }

    #[test]
    fn rejects_non_positive_c() {
        let mut classifier = LogisticClassifier::new(LogisticParams {
            c: 0.0,
            max_iterations: 10,
        });
        let x = Array2::zeros((2, 1));
        let y = Array1::from_vec(vec![0, 1]);
        assert!(classifier.fit(&x, &y).is_err());
    }
}
