//! Error types for the CLI application.

use sift_extractor::ExtractorError;
use sift_llm::LlmError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Extraction failed
    #[error("{0}")]
    Extractor(#[from] ExtractorError),

    /// Backend could not be set up
    #[error("Backend error: {0}")]
    Backend(#[from] LlmError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CliError {
    /// Failing protocol stage, when the error came from a model turn
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            CliError::Extractor(e) => e.stage().map(|stage| stage.as_str()),
            _ => None,
        }
    }
}
