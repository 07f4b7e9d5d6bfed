//! credit-risk-core: training pipeline and predictor for loan default risk.
//!
//! The crate covers the offline batch (ingestion, feature transformation,
//! resampled grid search over a few classifier families) and the online side
//! (loading the two persisted artifacts and scoring one applicant).
//!
//! Artifacts are plain serde values wrapped in a small envelope that carries
//! the training run id, so a preprocessor and a model from different runs are
//! never paired by accident.
pub mod artifact;
pub mod config;
pub mod data_handling;
pub mod error;
pub mod ingestion;
pub mod io;
pub mod model_selection;
pub mod models;
pub mod pipeline;
pub mod predict;
pub mod preprocessing;
pub mod report;
pub mod resampling;
pub mod stats;
pub mod tracking;

pub use data_handling::{ApplicantRecord, Decision};
pub use error::{PipelineError, Result};
pub use predict::Predictor;
