use ndarray::{Array1, Array2};

use crate::error::Result;

/// The contract every model family implements so model selection can treat
/// them uniformly. Labels are `0` (repaid) and `1` (default).
pub trait ClassifierModel {
    /// Fit on a feature matrix and its labels, replacing any previous fit.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>) -> Result<()>;

    /// Predict hard labels. Fails if the model has not been fitted.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>>;

    /// Human readable name for logs and reports
    fn name(&self) -> &str {
        "classifier"
    }
}
