use anyhow::Result;
use clap::ArgMatches;
use credit_risk_core::config::PipelineConfig;
use std::path::PathBuf;

use crate::util::{load_pipeline_config, validate_csv_file};

/// Load the JSON config (or defaults) and apply the `train` CLI overrides.
pub fn from_arguments(matches: &ArgMatches) -> Result<PipelineConfig> {
    let config_path = matches.get_one::<PathBuf>("config");
    let mut config = load_pipeline_config(config_path.map(PathBuf::as_path))?;

    if let Some(raw_data) = matches.get_one::<String>("raw_data") {
        validate_csv_file(raw_data)?;
        config.paths.raw_data = PathBuf::from(raw_data);
    }

    if let Some(seed) = matches.get_one::<u64>("seed") {
        config.split.seed = *seed;
        config.selection.seed = *seed;
    }

    if matches.get_flag("no_report") {
        config.paths.report = None;
    }

    Ok(config)
}
