//! Data ingestion: read the raw dataset, split it once into train/test with a
//! fixed seed, and persist both partitions.
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::{PathsConfig, SplitConfig};
use crate::error::{PipelineError, Result};
use crate::io::{read_raw_table, write_raw_table};

/// Paths of the two persisted partitions.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestionOutput {
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    pub n_train: usize,
    pub n_test: usize,
}

/// Shuffle `0..n_rows` with `seed` and cut off the first
/// `ceil(n_rows * test_fraction)` indices as the test partition.
///
/// Returns `(train_indices, test_indices)`.
pub fn train_test_split_indices(
    n_rows: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PipelineError::InvalidInput(format!(
            "test_fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }
    let n_test = (n_rows as f64 * test_fraction).ceil() as usize;
    if n_rows == 0 || n_test == 0 || n_test >= n_rows {
        return Err(PipelineError::InvalidInput(format!(
            "cannot split {} rows with test_fraction {}: a partition would be empty",
            n_rows, test_fraction
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..n_rows).collect();
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok((train, indices))
}

pub struct DataIngestion {
    raw_data: PathBuf,
    train_data: PathBuf,
    test_data: PathBuf,
    split: SplitConfig,
}

impl DataIngestion {
    pub fn new(paths: &PathsConfig, split: &SplitConfig) -> Self {
        Self {
            raw_data: paths.raw_data.clone(),
            train_data: paths.train_data.clone(),
            test_data: paths.test_data.clone(),
            split: split.clone(),
        }
    }

    pub fn run(&self) -> Result<IngestionOutput> {
        log::info!("Starting data ingestion from {}", self.raw_data.display());
        let table = read_raw_table(&self.raw_data)?;
        log::info!(
            "Dataset read: {} rows, {} columns",
            table.rows.len(),
            table.headers.len()
        );

        let (train_idx, test_idx) =
            train_test_split_indices(table.rows.len(), self.split.test_fraction, self.split.seed)?;

        write_raw_table(&self.train_data, &table.select(&train_idx))?;
        write_raw_table(&self.test_data, &table.select(&test_idx))?;

        log::info!(
            "Data ingestion completed: {} train rows -> {}, {} test rows -> {}",
            train_idx.len(),
            self.train_data.display(),
            test_idx.len(),
            self.test_data.display()
        );

        Ok(IngestionOutput {
            train_path: self.train_data.clone(),
            test_path: self.test_data.clone(),
            n_train: train_idx.len(),
            n_test: test_idx.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn split_is_reproducible_for_a_seed() {
        let a = train_test_split_indices(100, 0.2, 42).unwrap();
        let b = train_test_split_indices(100, 0.2, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn split_sizes_and_disjointness() {
        let (train, test) = train_test_split_indices(101, 0.2, 7).unwrap();
        assert_eq!(test.len(), 21);
        assert_eq!(train.len(), 80);
        let all: HashSet<_> = train.iter().chain(test.iter()).collect();
        assert_eq!(all.len(), 101);
    }

    #[test]
    fn split_rejects_degenerate_inputs() {
        assert!(train_test_split_indices(0, 0.2, 1).is_err());
        assert!(train_test_split_indices(1, 0.2, 1).is_err());
        assert!(train_test_split_indices(10, 1.0, 1).is_err());
    }
}
