use anyhow::{Context, Result};
use credit_risk_core::config::PipelineConfig;
use std::fs;
use std::path::{Path, PathBuf};

pub fn validate_csv_file(path: &str) -> Result<()> {
    let pb = PathBuf::from(path);

    let ext = pb
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());
    if ext.as_deref() != Some("csv") {
        anyhow::bail!("File must have a .csv extension: {}", path);
    }

    if !pb.exists() {
        anyhow::bail!("File does not exist: {}", path);
    }

    Ok(())
}

/// Read a pipeline configuration, or fall back to the defaults when no
/// path is given. The effective defaults are logged so they can be copied
/// into a file.
pub fn load_pipeline_config(config_path: Option<&Path>) -> Result<PipelineConfig> {
    match config_path {
        Some(path) => {
            let config_json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            serde_json::from_str(&config_json)
                .with_context(|| format!("Failed to parse config file: {:?}", path))
        }
        None => {
            let config = PipelineConfig::default();
            log::info!(
                "No config file provided; using defaults:\n{}",
                serde_json::to_string_pretty(&config)?
            );
            Ok(config)
        }
    }
}
