//! Minority-class oversampling (SMOTE).
//!
//! Synthetic rows are interpolated between a random minority row and one of
//! its nearest minority neighbours until both classes have the same count.
//! The original rows are kept, in order, at the top of the output.
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone)]
pub struct Smote {
    pub k_neighbors: usize,
    pub seed: u64,
}

impl Default for Smote {
    fn default() -> Self {
        Self {
            k_neighbors: 5,
            seed: 42,
        }
    }
}

impl Smote {
    pub fn new(k_neighbors: usize, seed: u64) -> Self {
        Self { k_neighbors, seed }
    }

    /// Return `(x, y)` with the minority class grown to the majority count.
    pub fn fit_resample(
        &self,
        x: &Array2<f64>,
        y: &Array1<usize>,
    ) -> Result<(Array2<f64>, Array1<usize>)> {
        if x.nrows() != y.len() {
            return Err(PipelineError::InvalidInput(format!(
                "{} feature rows but {} labels",
                x.nrows(),
                y.len()
            )));
        }

        let positives: Vec<usize> = (0..y.len()).filter(|&i| y[i] == 1).collect();
        let negatives: Vec<usize> = (0..y.len()).filter(|&i| y[i] != 1).collect();
        let (minority, minority_label, n_majority) = if positives.len() <= negatives.len() {
            (positives, 1usize, negatives.len())
        } else {
            (negatives, 0usize, positives.len())
        };

        let n_synthetic = n_majority - minority.len();
        if n_synthetic == 0 {
            return Ok((x.clone(), y.clone()));
        }
        if minority.len() < 2 {
            return Err(PipelineError::TrainingFailure(format!(
                "SMOTE needs at least 2 minority samples, got {}",
                minority.len()
            )));
        }

        let k = self.k_neighbors.min(minority.len() - 1).max(1);
        let minority_x = x.select(Axis(0), &minority);
        let neighbors = nearest_neighbors(&minority_x, k);

        log::debug!(
            "SMOTE: {} minority (label {}) vs {} majority, generating {} samples with k={}",
            minority.len(),
            minority_label,
            n_majority,
            n_synthetic,
            k
        );

        let mut rng = StdRng::seed_from_u64(self.seed);
        let ncols = x.ncols();
        let mut synthetic = Array2::<f64>::zeros((n_synthetic, ncols));
        for mut row in synthetic.rows_mut() {
            let i = rng.gen_range(0..minority.len());
            let j = neighbors[i][rng.gen_range(0..k)];
            let gap: f64 = rng.gen();
            let base = minority_x.row(i);
            let other = minority_x.row(j);
            for c in 0..ncols {
                row[c] = base[c] + gap * (other[c] - base[c]);
            }
        }

        let x_out = ndarray::concatenate(Axis(0), &[x.view(), synthetic.view()])
            .map_err(|e| PipelineError::TrainingFailure(e.to_string()))?;
        let mut y_out = y.to_vec();
        y_out.extend(std::iter::repeat(minority_label).take(n_synthetic));

        Ok((x_out, Array1::from_vec(y_out)))
    }
}

fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Brute-force k nearest neighbours of every row, excluding the row itself.
/// Ties are broken by row index so the result is deterministic.
fn nearest_neighbors(x: &Array2<f64>, k: usize) -> Vec<Vec<usize>> {
    (0..x.nrows())
        .into_par_iter()
        .map(|i| {
            let row = x.row(i);
            let mut dists: Vec<(f64, usize)> = (0..x.nrows())
                .filter(|&j| j != i)
                .map(|j| (squared_distance(row, x.row(j)), j))
                .collect();
            dists.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            dists.into_iter().take(k).map(|(_, j)| j).collect()
        })
        .collect()
}
