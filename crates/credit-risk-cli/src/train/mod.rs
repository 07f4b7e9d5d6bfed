pub mod input;

use anyhow::{Context, Result};
use credit_risk_core::config::PipelineConfig;
use credit_risk_core::pipeline::{TrainPipeline, TrainingSummary};

/// Run ingestion, transformation and model selection end to end.
pub fn run_training(config: &PipelineConfig) -> Result<TrainingSummary> {
    log::info!(
        "[CreditRisk::Train] Raw data: {}",
        config.paths.raw_data.display()
    );
    let summary = TrainPipeline::new(config.clone())
        .run()
        .context("Training pipeline failed")?;
    log::info!(
        "[CreditRisk::Train] Run {} selected {} (cv F1 {:.4}, test F1 {:.4})",
        summary.run_id,
        summary.outcome.winner.family(),
        summary.outcome.cv_f1,
        summary.outcome.test_f1
    );
    Ok(summary)
}
