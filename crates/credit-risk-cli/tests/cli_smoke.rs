//! CLI binary smoke tests using assert_cmd.

mod common;

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("credit-risk").unwrap()
}

#[test]
fn no_args_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("train"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("credit-risk"));
}

#[test]
fn train_nonexistent_config_errors() {
    cmd()
        .args(["train", "/nonexistent/config.json"])
        .assert()
        .failure();
}

#[test]
fn train_rejects_non_csv_raw_data() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("raw.txt");
    std::fs::write(&raw, "x").unwrap();
    cmd()
        .args(["train", "--raw-data", raw.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains(".csv"));
}

#[test]
fn train_with_missing_raw_data_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::test_config(dir.path());
    config.paths.raw_data = dir.path().join("missing.csv");
    let config_path = common::write_config(dir.path(), &config);

    cmd()
        .arg("train")
        .arg(&config_path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Training failed"));
}

#[test]
fn train_prints_the_f1_score() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::test_config(dir.path());
    let config_path = common::write_config(dir.path(), &config);

    cmd()
        .arg("train")
        .arg(&config_path)
        .arg("--no-report")
        .assert()
        .success()
        .stdout(predicate::str::contains("Model training completed with F1 Score:"));

    assert!(config.paths.model.is_file());
    assert!(config.paths.preprocessor.is_file());
    assert!(!config.paths.report.unwrap().exists());
}

#[test]
fn serve_rejects_a_bad_address() {
    cmd()
        .args(["serve", "--addr", "not-an-address"])
        .assert()
        .failure();
}
