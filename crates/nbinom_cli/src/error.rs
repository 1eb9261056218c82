//! CLI error types

use nbinom_core::PrngError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by `nbinom` commands
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Prng(#[from] PrngError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
