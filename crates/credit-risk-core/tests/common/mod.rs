#![allow(dead_code)]
//! Shared fixtures: a small deterministic credit dataset and tiny grids.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use credit_risk_core::config::{FamilyGrid, PathsConfig, PipelineConfig, SelectionConfig};
use credit_risk_core::ApplicantRecord;

pub const HEADER: &str = "person_age,person_income,person_home_ownership,person_emp_length,loan_intent,loan_grade,loan_amnt,loan_int_rate,loan_status,loan_percent_income,cb_person_default_on_file,cb_person_cred_hist_length";

const HOMES: [&str; 3] = ["RENT", "OWN", "MORTGAGE"];
const INTENTS: [&str; 6] = [
    "EDUCATION",
    "MEDICAL",
    "VENTURE",
    "PERSONAL",
    "DEBTCONSOLIDATION",
    "HOMEIMPROVEMENT",
];
const GRADES: [&str; 5] = ["A", "B", "C", "D", "E"];

/// `n` rows; defaults are driven by the loan-to-income ratio and the grade,
/// with a few missing employment lengths and interest rates.
pub fn synthetic_csv(n: usize) -> String {
    let mut out = String::new();
    writeln!(out, "{}", HEADER).unwrap();
    for i in 0..n {
        let age = 20 + i % 30;
        let income = 20_000 + (i * 1373) % 80_000;
        let grade_idx = (i * 7) % 5;
        let loan = 1_000 + (i * 977) % 20_000;
        let pct = ((loan as f64 / income as f64) * 100.0).round() / 100.0;
        let emp = if i % 17 == 0 {
            String::new()
        } else {
            format!("{}.0", i % 10)
        };
        let rate = if i % 13 == 0 {
            String::new()
        } else {
            format!("{:.2}", 6.0 + ((i * 31) % 150) as f64 / 10.0)
        };
        let status = usize::from(pct > 0.3 || (grade_idx >= 3 && i % 3 == 0));
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            age,
            income,
            HOMES[i % 3],
            emp,
            INTENTS[i % 6],
            GRADES[grade_idx],
            loan,
            rate,
            status,
            pct,
            if i % 5 == 0 { "Y" } else { "N" },
            2 + i % 15
        )
        .unwrap();
    }
    out
}

pub fn write_dataset(path: &Path, n: usize) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, synthetic_csv(n)).unwrap();
}

/// All paths under `root`, a freshly written raw dataset, and grids small
/// enough for a test run.
pub fn test_config(root: &Path, n_rows: usize) -> PipelineConfig {
    let paths = PathsConfig {
        raw_data: root.join("raw").join("credit.csv"),
        train_data: root.join("processed").join("train.csv"),
        test_data: root.join("processed").join("test.csv"),
        preprocessor: root.join("models").join("preprocessor.json"),
        model: root.join("models").join("model.json"),
        experiment_log: root.join("experiments").join("runs.jsonl"),
        report: Some(root.join("reports").join("training_report.html")),
    };
    write_dataset(&paths.raw_data, n_rows);
    PipelineConfig {
        experiment_name: "integration".to_string(),
        paths,
        selection: tiny_selection(),
        ..PipelineConfig::default()
    }
}

pub fn tiny_selection() -> SelectionConfig {
    SelectionConfig {
        grids: vec![
            FamilyGrid::LogisticRegression {
                c: vec![1.0],
                max_iterations: vec![100],
            },
            FamilyGrid::GradientBoosting {
                learning_rate: vec![0.1],
                num_boost_round: vec![10],
                max_depth: vec![3],
                subsample: vec![1.0],
                scale_pos_weight: vec![1.0],
            },
            FamilyGrid::DecisionTree {
                max_depth: vec![3, 5],
                min_weight_leaf: vec![1.0],
                balanced: vec![false],
            },
        ],
        ..SelectionConfig::default()
    }
}

pub fn sample_applicant() -> ApplicantRecord {
    ApplicantRecord {
        age: 25,
        income: 50000.0,
        home_ownership: "RENT".to_string(),
        employment_length: Some(2.0),
        loan_intent: "EDUCATION".to_string(),
        loan_grade: "B".to_string(),
        loan_amount: 10000.0,
        interest_rate: Some(11.5),
        default_on_file: "N".to_string(),
        loan_percent_income: 0.2,
        credit_history_length: 3.0,
    }
}
