#![allow(dead_code)]
//! A small deterministic dataset and a config with tiny grids.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use credit_risk_core::config::{FamilyGrid, PathsConfig, PipelineConfig, SelectionConfig};

const HEADER: &str = "person_age,person_income,person_home_ownership,person_emp_length,loan_intent,loan_grade,loan_amnt,loan_int_rate,loan_status,loan_percent_income,cb_person_default_on_file,cb_person_cred_hist_length";

pub fn write_dataset(path: &Path, n: usize) {
    let homes = ["RENT", "OWN", "MORTGAGE"];
    let intents = ["EDUCATION", "MEDICAL", "VENTURE", "PERSONAL"];
    let grades = ["A", "B", "C", "D", "E"];
    let mut out = String::new();
    writeln!(out, "{}", HEADER).unwrap();
    for i in 0..n {
        let income = 20_000 + (i * 1373) % 80_000;
        let grade = (i * 7) % 5;
        let loan = 1_000 + (i * 977) % 20_000;
        let pct = ((loan as f64 / income as f64) * 100.0).round() / 100.0;
        let status = usize::from(pct > 0.3 || (grade >= 3 && i % 3 == 0));
        writeln!(
            out,
            "{},{},{},{},{},{},{},{:.2},{},{},{},{}",
            20 + i % 30,
            income,
            homes[i % 3],
            i % 10,
            intents[i % 4],
            grades[grade],
            loan,
            6.0 + ((i * 31) % 150) as f64 / 10.0,
            status,
            pct,
            if i % 5 == 0 { "Y" } else { "N" },
            2 + i % 15
        )
        .unwrap();
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, out).unwrap();
}

pub fn test_config(root: &Path) -> PipelineConfig {
    let paths = PathsConfig {
        raw_data: root.join("raw.csv"),
        train_data: root.join("processed").join("train.csv"),
        test_data: root.join("processed").join("test.csv"),
        preprocessor: root.join("models").join("preprocessor.json"),
        model: root.join("models").join("model.json"),
        experiment_log: root.join("experiments").join("runs.jsonl"),
        report: Some(root.join("reports").join("training_report.html")),
    };
    write_dataset(&paths.raw_data, 150);
    PipelineConfig {
        experiment_name: "cli-test".to_string(),
        paths,
        selection: SelectionConfig {
            grids: vec![
                FamilyGrid::LogisticRegression {
                    c: vec![1.0],
                    max_iterations: vec![100],
                },
                FamilyGrid::DecisionTree {
                    max_depth: vec![4],
                    min_weight_leaf: vec![1.0],
                    balanced: vec![false],
                },
            ],
            ..SelectionConfig::default()
        },
        ..PipelineConfig::default()
    }
}

/// Write `config` next to the data and return its path.
pub fn write_config(root: &Path, config: &PipelineConfig) -> PathBuf {
    let path = root.join("config.json");
    fs::write(&path, serde_json::to_string_pretty(config).unwrap()).unwrap();
    path
}

pub const SAMPLE_FORM: &str = "age=25&income=50000&home_ownership=RENT&employment_length=2&loan_intent=EDUCATION&loan_grade=B&loan_amount=10000&interest_rate=11.5&default_on_file=N&loan_percent_income=0.2&credit_history_length=3";
