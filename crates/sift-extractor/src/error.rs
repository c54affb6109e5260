//! Error types for the Extractor

use crate::repair::RepairError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Protocol stage at which a model turn was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// The only turn of a simple extraction
    SingleShot,

    /// Yes/no question of an advanced extraction
    Classification,

    /// Free-text description of the findings
    Elaboration,

    /// Findings as a JSON record
    DetailExtraction,
}

impl Stage {
    /// Stage name as used in logs and error reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::SingleShot => "single_shot",
            Stage::Classification => "classification",
            Stage::Elaboration => "elaboration",
            Stage::DetailExtraction => "detail_extraction",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The language-model backend failed on a turn
    #[error("Backend failure during {stage}: {message}")]
    Backend {
        /// Turn that failed
        stage: Stage,
        /// Backend error message
        message: String,
    },

    /// No schema is registered for the requested language/strategy pair
    #[error("Unsupported configuration: language '{language}', strategy '{strategy}'")]
    UnsupportedConfiguration {
        /// Requested language
        language: String,
        /// Requested strategy
        strategy: String,
    },

    /// The model's structured reply could not be parsed, even after repair
    #[error("Unparseable model output during {stage}: {source}")]
    Unparseable {
        /// Turn whose reply was unparseable
        stage: Stage,
        /// Why repair failed
        #[source]
        source: RepairError,
    },

    /// Request rejected before any model call
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Text exceeds maximum length
    #[error("Text too long: {0} chars (max: {1})")]
    TextTooLong(usize, usize),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The worker running the request did not complete
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl ExtractorError {
    /// Stage at which the extraction failed, if a model turn was involved
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ExtractorError::Backend { stage, .. } | ExtractorError::Unparseable { stage, .. } => {
                Some(*stage)
            }
            _ => None,
        }
    }

    pub(crate) fn backend(stage: Stage) -> impl FnOnce(String) -> Self {
        move |message| ExtractorError::Backend { stage, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_reported_for_model_failures() {
        let error = ExtractorError::Backend {
            stage: Stage::Elaboration,
            message: "timeout".to_string(),
        };
        assert_eq!(error.stage(), Some(Stage::Elaboration));
        assert_eq!(
            error.to_string(),
            "Backend failure during elaboration: timeout"
        );

        let error = ExtractorError::Unparseable {
            stage: Stage::DetailExtraction,
            source: RepairError::UnbalancedBrackets { offset: 3 },
        };
        assert_eq!(error.stage(), Some(Stage::DetailExtraction));
    }

    #[test]
    fn test_no_stage_for_request_errors() {
        let error = ExtractorError::UnsupportedConfiguration {
            language: "fr".to_string(),
            strategy: "simple".to_string(),
        };
        assert_eq!(error.stage(), None);
        assert_eq!(ExtractorError::TextTooLong(10, 5).stage(), None);
    }
}
