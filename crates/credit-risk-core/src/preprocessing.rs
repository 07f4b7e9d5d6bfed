//! Column-wise preprocessing of applicant records.
//!
//! Three disjoint column groups are handled differently:
//!
//! * `interest_rate`: mean imputation, then standardization.
//! * the other numeric columns: median imputation, then standardization.
//! * categorical columns: most-frequent imputation, one-hot encoding over the
//!   fitted vocabulary (first category dropped, unseen categories encode as
//!   all zeros), then scaling by the standard deviation without centering.
//!
//! `Preprocessor::fit` is the only place statistics are computed. `transform`
//! takes `&self` and only reads them, so applying the preprocessor to test
//! data or to a web request can never leak information back into it.
use std::collections::{BTreeMap, BTreeSet};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::data_handling::{ApplicantRecord, CategoricalColumn, NumericColumn};
use crate::error::{PipelineError, Result};

pub const MEAN_IMPUTED: [NumericColumn; 1] = [NumericColumn::InterestRate];

pub const MEDIAN_IMPUTED: [NumericColumn; 6] = [
    NumericColumn::Age,
    NumericColumn::Income,
    NumericColumn::EmploymentLength,
    NumericColumn::LoanAmount,
    NumericColumn::LoanPercentIncome,
    NumericColumn::CreditHistoryLength,
];

pub const CATEGORICAL: [CategoricalColumn; 4] = [
    CategoricalColumn::HomeOwnership,
    CategoricalColumn::LoanGrade,
    CategoricalColumn::DefaultOnFile,
    CategoricalColumn::LoanIntent,
];

/// Simple standard scaler (per-column mean/std).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
    pub with_mean: bool,
}

impl Scaler {
    /// Columns with a smaller stddev are left unscaled.
    const MIN_STD: f64 = 1e-12;

    pub fn transform_in_place(&self, x: &mut Array2<f64>) {
        for mut row in x.rows_mut() {
            for (c, v) in row.iter_mut().enumerate() {
                let centered = if self.with_mean { *v - self.mean[c] } else { *v };
                *v = centered / self.std[c];
            }
        }
    }
}

/// Fit a `Scaler` from an `Array2<f64>` where rows are samples and
/// columns are features. Uses the population standard deviation.
pub fn fit_scaler(x: &Array2<f64>, with_mean: bool) -> Scaler {
    let (nrows, ncols) = x.dim();
    let mut mean = vec![0.0f64; ncols];
    let mut std = vec![1.0f64; ncols];
    if nrows == 0 {
        return Scaler {
            mean,
            std,
            with_mean,
        };
    }

    let nrows_f = nrows as f64;
    for row in x.rows() {
        for (c, v) in row.iter().enumerate() {
            mean[c] += v;
        }
    }
    for v in mean.iter_mut() {
        *v /= nrows_f;
    }

    let mut var = vec![0.0f64; ncols];
    for row in x.rows() {
        for (c, v) in row.iter().enumerate() {
            let d = v - mean[c];
            var[c] += d * d;
        }
    }
    for (s, v) in std.iter_mut().zip(var) {
        let sd = (v / nrows_f).sqrt();
        *s = if sd < Scaler::MIN_STD { 1.0 } else { sd };
    }

    Scaler {
        mean,
        std,
        with_mean,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputeStrategy {
    Mean,
    Median,
}

/// Imputation, then standardization, for a group of numeric columns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NumericPipeline {
    pub columns: Vec<NumericColumn>,
    pub strategy: ImputeStrategy,
    pub fill: Vec<f64>,
    pub scaler: Scaler,
}

impl NumericPipeline {
    fn fit(
        records: &[ApplicantRecord],
        columns: &[NumericColumn],
        strategy: ImputeStrategy,
    ) -> Result<Self> {
        let mut fill = Vec::with_capacity(columns.len());
        for &col in columns {
            let mut observed: Vec<f64> = records.iter().filter_map(|r| col.value(r)).collect();
            if observed.is_empty() {
                return Err(PipelineError::TransformFailure(format!(
                    "column {} has no observed values to impute from",
                    col.header()
                )));
            }
            let value = match strategy {
                ImputeStrategy::Mean => observed.iter().sum::<f64>() / observed.len() as f64,
                ImputeStrategy::Median => median(&mut observed),
            };
            fill.push(value);
        }

        let scaler = fit_scaler(&impute(records, columns, &fill), true);
        Ok(Self {
            columns: columns.to_vec(),
            strategy,
            fill,
            scaler,
        })
    }

    fn transform(&self, records: &[ApplicantRecord]) -> Array2<f64> {
        let mut x = impute(records, &self.columns, &self.fill);
        self.scaler.transform_in_place(&mut x);
        x
    }

    fn feature_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.header().to_string()).collect()
    }
}

/// Most-frequent imputation, one-hot encoding (first category dropped,
/// unknown categories ignored), then scaling without centering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoricalPipeline {
    pub columns: Vec<CategoricalColumn>,
    pub fill: Vec<String>,
    /// Sorted vocabulary per column, including the dropped first category.
    pub categories: Vec<Vec<String>>,
    pub scaler: Scaler,
}

impl CategoricalPipeline {
    fn fit(records: &[ApplicantRecord], columns: &[CategoricalColumn]) -> Result<Self> {
        let mut fill = Vec::with_capacity(columns.len());
        let mut categories = Vec::with_capacity(columns.len());
        for &col in columns {
            let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
            for r in records {
                if let Some(v) = col.value(r) {
                    *counts.entry(v).or_default() += 1;
                }
            }
            let mode = most_frequent(&counts).ok_or_else(|| {
                PipelineError::TransformFailure(format!(
                    "column {} has no observed values to impute from",
                    col.header()
                ))
            })?;
            fill.push(mode.to_string());
            let vocab: BTreeSet<&str> = counts.keys().copied().collect();
            categories.push(vocab.into_iter().map(str::to_string).collect());
        }

        let scaler = fit_scaler(&one_hot(records, columns, &fill, &categories), false);
        Ok(Self {
            columns: columns.to_vec(),
            fill,
            categories,
            scaler,
        })
    }

    fn width(&self) -> usize {
        encoded_width(&self.categories)
    }

    fn transform(&self, records: &[ApplicantRecord]) -> Array2<f64> {
        let mut x = one_hot(records, &self.columns, &self.fill, &self.categories);
        self.scaler.transform_in_place(&mut x);
        x
    }

    fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .zip(&self.categories)
            .flat_map(|(col, vocab)| {
                vocab
                    .iter()
                    .skip(1)
                    .map(move |v| format!("{}={}", col.header(), v))
            })
            .collect()
    }
}

/// The fitted column transformer persisted as the preprocessor artifact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    pub mean_pipeline: NumericPipeline,
    pub median_pipeline: NumericPipeline,
    pub categorical_pipeline: CategoricalPipeline,
}

impl Preprocessor {
    pub fn fit(records: &[ApplicantRecord]) -> Result<Self> {
        if records.is_empty() {
            return Err(PipelineError::TransformFailure(
                "cannot fit a preprocessor on zero records".to_string(),
            ));
        }
        log::info!("Mean imputation columns: {:?}", MEAN_IMPUTED);
        log::info!("Median imputation columns: {:?}", MEDIAN_IMPUTED);
        log::info!("Categorical columns: {:?}", CATEGORICAL);

        let preprocessor = Self {
            mean_pipeline: NumericPipeline::fit(records, &MEAN_IMPUTED, ImputeStrategy::Mean)?,
            median_pipeline: NumericPipeline::fit(records, &MEDIAN_IMPUTED, ImputeStrategy::Median)?,
            categorical_pipeline: CategoricalPipeline::fit(records, &CATEGORICAL)?,
        };
        log::debug!(
            "Preprocessor fitted on {} records -> {} features",
            records.len(),
            preprocessor.n_features()
        );
        Ok(preprocessor)
    }

    /// Apply the fitted statistics. Never refits.
    pub fn transform(&self, records: &[ApplicantRecord]) -> Result<Array2<f64>> {
        let blocks = [
            self.mean_pipeline.transform(records),
            self.median_pipeline.transform(records),
            self.categorical_pipeline.transform(records),
        ];
        let views: Vec<_> = blocks.iter().map(|b| b.view()).collect();
        let x = ndarray::concatenate(ndarray::Axis(1), &views)
            .map_err(|e| PipelineError::TransformFailure(e.to_string()))?;

        if x.iter().any(|v| !v.is_finite()) {
            return Err(PipelineError::TransformFailure(
                "transformed features contain non-finite values".to_string(),
            ));
        }
        Ok(x)
    }

    /// Convenience: fit on `records` and return the fitted preprocessor with
    /// the transformed matrix.
    pub fn fit_transform(records: &[ApplicantRecord]) -> Result<(Self, Array2<f64>)> {
        let preprocessor = Self::fit(records)?;
        let x = preprocessor.transform(records)?;
        Ok((preprocessor, x))
    }

    pub fn n_features(&self) -> usize {
        self.mean_pipeline.columns.len()
            + self.median_pipeline.columns.len()
            + self.categorical_pipeline.width()
    }

    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.mean_pipeline.feature_names();
        names.extend(self.median_pipeline.feature_names());
        names.extend(self.categorical_pipeline.feature_names());
        names
    }
}

fn impute(records: &[ApplicantRecord], columns: &[NumericColumn], fill: &[f64]) -> Array2<f64> {
    Array2::from_shape_fn((records.len(), columns.len()), |(r, c)| {
        columns[c].value(&records[r]).unwrap_or(fill[c])
    })
}

fn encoded_width(categories: &[Vec<String>]) -> usize {
    categories.iter().map(|c| c.len().saturating_sub(1)).sum()
}

fn one_hot(
    records: &[ApplicantRecord],
    columns: &[CategoricalColumn],
    fill: &[String],
    categories: &[Vec<String>],
) -> Array2<f64> {
    let mut x = Array2::zeros((records.len(), encoded_width(categories)));
    for (r, record) in records.iter().enumerate() {
        let mut offset = 0;
        for (c, col) in columns.iter().enumerate() {
            let vocab = &categories[c];
            let value = col.value(record).unwrap_or(fill[c].as_str());
            // Position 0 is the dropped category; unknown values stay all zeros.
            if let Ok(pos) = vocab.binary_search_by(|v| v.as_str().cmp(value)) {
                if pos > 0 {
                    x[(r, offset + pos - 1)] = 1.0;
                }
            }
            offset += vocab.len().saturating_sub(1);
        }
    }
    x
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

/// Highest count wins; ties go to the lexicographically smallest value.
fn most_frequent<'a>(counts: &BTreeMap<&'a str, usize>) -> Option<&'a str> {
    let mut best: Option<(&str, usize)> = None;
    for (&value, &count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(v, _)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_even_and_odd() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn most_frequent_breaks_ties_lexicographically() {
        let mut counts = BTreeMap::new();
        counts.insert("RENT", 2);
        counts.insert("OWN", 2);
        counts.insert("MORTGAGE", 1);
        assert_eq!(most_frequent(&counts), Some("OWN"));
    }

    #[test]
    fn scaler_leaves_constant_columns_unscaled() {
        let x = Array2::from_shape_vec((3, 2), vec![1.0, 5.0, 2.0, 5.0, 3.0, 5.0]).unwrap();
        let sc = fit_scaler(&x, true);
        assert_eq!(sc.std[1], 1.0);
        let mut t = x.clone();
        sc.transform_in_place(&mut t);
        assert!(t.column(1).iter().all(|v| *v == 0.0));
    }
}
