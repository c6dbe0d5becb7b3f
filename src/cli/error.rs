//! CLI error type

use crate::download::DownloadError;
use crate::import::ImportError;
use crate::repository::RepositoryError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read file {0}: {1}")]
    FileReadError(PathBuf, String),
    #[error("Invalid config file {0}: {1}")]
    ConfigError(PathBuf, String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Download(#[from] DownloadError),
}
