//! CLI module for the datahub-schema binary

pub mod commands;
pub mod error;

pub use error::CliError;

use crate::import::ExtractionConfig;
use std::path::Path;

/// Load the extraction config, falling back to defaults without a file
pub fn load_config(path: Option<&Path>) -> Result<ExtractionConfig, CliError> {
    let Some(path) = path else {
        return Ok(ExtractionConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::FileReadError(path.to_path_buf(), e.to_string()))?;
    ExtractionConfig::from_toml(&content)
        .map_err(|e| CliError::ConfigError(path.to_path_buf(), e.to_string()))
}
