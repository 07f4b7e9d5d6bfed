//! Applicant records, labelled datasets and the column accessors used by the
//! preprocessor.
//!
//! An `ApplicantRecord` is immutable once built. The two fields that are
//! nullable in the source data (`employment_length`, `interest_rate`) are
//! optional; categorical values are kept as free text and normalised to
//! upper case so the web form and the CSV agree on spelling.
use std::fmt;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub age: u32,
    pub income: f64,
    pub home_ownership: String,
    pub employment_length: Option<f64>,
    pub loan_intent: String,
    pub loan_grade: String,
    pub loan_amount: f64,
    pub interest_rate: Option<f64>,
    pub default_on_file: String,
    pub loan_percent_income: f64,
    pub credit_history_length: f64,
}

impl ApplicantRecord {
    /// Check the invariants a record must hold before it reaches the
    /// preprocessor. Categorical text is upper-cased in place.
    pub fn validated(mut self) -> Result<Self> {
        let finite = [
            ("income", Some(self.income)),
            ("employment_length", self.employment_length),
            ("loan_amount", Some(self.loan_amount)),
            ("interest_rate", self.interest_rate),
            ("loan_percent_income", Some(self.loan_percent_income)),
            ("credit_history_length", Some(self.credit_history_length)),
        ];
        for (name, value) in finite {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(PipelineError::InvalidInput(format!(
                        "{} must be a non-negative number, got {}",
                        name, v
                    )));
                }
            }
        }

        for field in [
            &mut self.home_ownership,
            &mut self.loan_intent,
            &mut self.loan_grade,
            &mut self.default_on_file,
        ] {
            *field = field.trim().to_uppercase();
        }

        Ok(self)
    }
}

/// The binary outcome shown to the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Declined,
}

impl Decision {
    /// Label 1 means the model expects a default.
    pub fn from_label(label: usize) -> Self {
        if label == 1 {
            Decision::Declined
        } else {
            Decision::Approved
        }
    }

    pub fn label(self) -> usize {
        match self {
            Decision::Approved => 0,
            Decision::Declined => 1,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Approved => write!(f, "approved"),
            Decision::Declined => write!(f, "declined"),
        }
    }
}

/// Numeric feature columns, named after the dataset header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericColumn {
    Age,
    Income,
    EmploymentLength,
    LoanAmount,
    InterestRate,
    LoanPercentIncome,
    CreditHistoryLength,
}

impl NumericColumn {
    pub fn value(self, record: &ApplicantRecord) -> Option<f64> {
        let v = match self {
            NumericColumn::Age => Some(record.age as f64),
            NumericColumn::Income => Some(record.income),
            NumericColumn::EmploymentLength => record.employment_length,
            NumericColumn::LoanAmount => Some(record.loan_amount),
            NumericColumn::InterestRate => record.interest_rate,
            NumericColumn::LoanPercentIncome => Some(record.loan_percent_income),
            NumericColumn::CreditHistoryLength => Some(record.credit_history_length),
        };
        v.filter(|x| x.is_finite())
    }

    pub fn header(self) -> &'static str {
        match self {
            NumericColumn::Age => "person_age",
            NumericColumn::Income => "person_income",
            NumericColumn::EmploymentLength => "person_emp_length",
            NumericColumn::LoanAmount => "loan_amnt",
            NumericColumn::InterestRate => "loan_int_rate",
            NumericColumn::LoanPercentIncome => "loan_percent_income",
            NumericColumn::CreditHistoryLength => "cb_person_cred_hist_length",
        }
    }
}

/// Categorical feature columns, named after the dataset header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalColumn {
    HomeOwnership,
    LoanIntent,
    LoanGrade,
    DefaultOnFile,
}

impl CategoricalColumn {
    /// Empty strings count as missing.
    pub fn value(self, record: &ApplicantRecord) -> Option<&str> {
        let v = match self {
            CategoricalColumn::HomeOwnership => record.home_ownership.as_str(),
            CategoricalColumn::LoanIntent => record.loan_intent.as_str(),
            CategoricalColumn::LoanGrade => record.loan_grade.as_str(),
            CategoricalColumn::DefaultOnFile => record.default_on_file.as_str(),
        };
        let v = v.trim();
        if v.is_empty() {
            None
        } else {
            Some(v)
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            CategoricalColumn::HomeOwnership => "person_home_ownership",
            CategoricalColumn::LoanIntent => "loan_intent",
            CategoricalColumn::LoanGrade => "loan_grade",
            CategoricalColumn::DefaultOnFile => "cb_person_default_on_file",
        }
    }
}

/// Records plus the `loan_status` target, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledDataset {
    pub records: Vec<ApplicantRecord>,
    pub labels: Array1<usize>,
}

impl LabeledDataset {
    pub fn new(records: Vec<ApplicantRecord>, labels: Vec<usize>) -> Result<Self> {
        if records.len() != labels.len() {
            return Err(PipelineError::InvalidInput(format!(
                "{} records but {} labels",
                records.len(),
                labels.len()
            )));
        }
        if let Some(bad) = labels.iter().find(|&&l| l > 1) {
            return Err(PipelineError::InvalidInput(format!(
                "loan_status must be 0 or 1, got {}",
                bad
            )));
        }
        Ok(Self {
            records,
            labels: Array1::from_vec(labels),
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn log_summary(&self, name: &str) {
        let positives = self.labels.iter().filter(|&&l| l == 1).count();
        log::info!(
            "{}: {} rows, {} defaults ({:.2}%)",
            name,
            self.len(),
            positives,
            if self.is_empty() {
                0.0
            } else {
                positives as f64 / self.len() as f64 * 100.0
            }
        );
    }
}

/// A transformed feature matrix with its labels.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    pub x: Array2<f64>,
    pub y: Array1<usize>,
}

impl FeatureSet {
    pub fn new(x: Array2<f64>, y: Array1<usize>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(PipelineError::InvalidInput(format!(
                "{} feature rows but {} labels",
                x.nrows(),
                y.len()
            )));
        }
        Ok(Self { x, y })
    }

    pub fn n_rows(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }
}
