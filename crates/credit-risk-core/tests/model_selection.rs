//! Model selection persists exactly one model: the best cross-validated one.

mod common;

use credit_risk_core::artifact::{load_artifact, ArtifactKind, RunId};
use credit_risk_core::config::FamilyGrid;
use credit_risk_core::error::PipelineError;
use credit_risk_core::ingestion::DataIngestion;
use credit_risk_core::model_selection::{grid_search, ModelArtifact, ModelTrainer};
use credit_risk_core::pipeline::DataTransformation;

#[test]
fn persists_the_single_best_candidate() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::test_config(dir.path(), 150);
    DataIngestion::new(&config.paths, &config.split).run().unwrap();
    let run_id = RunId::from("selection-test");
    let data = DataTransformation::new(&config.paths).run(&run_id).unwrap();

    let outcome = ModelTrainer::new(&config.selection, &config.paths.model)
        .run(&data.train, &data.test, &run_id)
        .unwrap();

    let best_cv = outcome
        .families
        .iter()
        .filter_map(|f| f.best.as_ref().and_then(|b| b.mean_f1))
        .fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(outcome.cv_f1, best_cv);
    assert!((0.0..=1.0).contains(&outcome.test_f1));

    let models: Vec<_> = std::fs::read_dir(dir.path().join("models"))
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .filter(|n| n.starts_with("model"))
        .collect();
    assert_eq!(models, vec!["model.json".to_string()]);

    let saved = load_artifact::<ModelArtifact>(&config.paths.model, ArtifactKind::Model).unwrap();
    assert_eq!(saved.payload.model_type, outcome.winner);
    assert_eq!(saved.payload.cv_f1, outcome.cv_f1);
    assert_eq!(saved.run_id, run_id);
}

#[test]
fn search_reports_every_family_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::test_config(dir.path(), 150);
    DataIngestion::new(&config.paths, &config.split).run().unwrap();
    let data = DataTransformation::new(&config.paths)
        .run(&RunId::from("order"))
        .unwrap();

    let results = grid_search(&config.selection, &data.train).unwrap();
    let families: Vec<_> = results.iter().map(|(f, _)| f.as_str()).collect();
    assert_eq!(
        families,
        vec!["logistic_regression", "gradient_boosting", "decision_tree"]
    );
    assert_eq!(results[2].1.len(), 2);
}

#[test]
fn failing_candidates_are_skipped_and_all_failing_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::test_config(dir.path(), 150);
    DataIngestion::new(&config.paths, &config.split).run().unwrap();
    let run_id = RunId::from("failing");
    let data = DataTransformation::new(&config.paths).run(&run_id).unwrap();

    // max_depth 0 is rejected by the tree wrapper.
    config.selection.grids = vec![FamilyGrid::DecisionTree {
        max_depth: vec![0, 4],
        min_weight_leaf: vec![1.0],
        balanced: vec![false],
    }];
    let outcome = ModelTrainer::new(&config.selection, &config.paths.model)
        .run(&data.train, &data.test, &run_id)
        .unwrap();
    assert_eq!(outcome.families[0].n_failed, 1);

    config.selection.grids = vec![FamilyGrid::DecisionTree {
        max_depth: vec![0],
        min_weight_leaf: vec![1.0],
        balanced: vec![true],
    }];
    let err = ModelTrainer::new(&config.selection, &dir.path().join("other.json"))
        .run(&data.train, &data.test, &run_id)
        .unwrap_err();
    assert!(matches!(err, PipelineError::TrainingFailure(_)));
    assert!(!dir.path().join("other.json").exists());
}

#[test]
fn empty_grid_list_is_invalid_input() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::test_config(dir.path(), 150);
    DataIngestion::new(&config.paths, &config.split).run().unwrap();
    let data = DataTransformation::new(&config.paths)
        .run(&RunId::from("empty"))
        .unwrap();
    config.selection.grids.clear();
    let err = grid_search(&config.selection, &data.train).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput(_)));
}
