//! Request and response types for extraction

use crate::error::ExtractorError;
use serde::{Deserialize, Serialize};
use sift_domain::RequestId;
use std::fmt;
use std::str::FromStr;

/// A structured record: the JSON object a detail turn is parsed into
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Language of the prompts and classification tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    En,
    /// German
    De,
}

impl Language {
    /// Every language with built-in prompts
    pub const ALL: [Language; 2] = [Language::En, Language::De];

    /// ISO 639-1 code
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::De => "de",
        }
    }

    /// Parse an ISO 639-1 code (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" => Some(Language::En),
            "de" => Some(Language::De),
            _ => None,
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unsupported language: {}", s))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the extraction conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// One prompt, one reply
    Simple,
    /// Classify, then describe, then list the findings as JSON
    Advanced,
}

impl Strategy {
    /// Every supported strategy
    pub const ALL: [Strategy; 2] = [Strategy::Simple, Strategy::Advanced];

    /// Strategy name
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Simple => "simple",
            Strategy::Advanced => "advanced",
        }
    }

    /// Parse a strategy name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Some(Strategy::Simple),
            "advanced" => Some(Strategy::Advanced),
            _ => None,
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unsupported strategy: {}", s))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to extract findings from a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRequest {
    /// Document text
    pub text: String,

    /// Prompt language
    pub language: Language,

    /// Conversation strategy
    pub strategy: Strategy,
}

impl ExtractionRequest {
    /// Create a request from already-typed parts
    pub fn new(text: impl Into<String>, language: Language, strategy: Strategy) -> Self {
        Self {
            text: text.into(),
            language,
            strategy,
        }
    }

    /// Create a request from untyped language and strategy names
    ///
    /// Unknown names are reported as an unsupported configuration.
    pub fn parse(
        text: impl Into<String>,
        language: &str,
        strategy: &str,
    ) -> Result<Self, ExtractorError> {
        match (Language::parse(language), Strategy::parse(strategy)) {
            (Some(language), Some(strategy)) => Ok(Self::new(text, language, strategy)),
            _ => Err(ExtractorError::UnsupportedConfiguration {
                language: language.to_string(),
                strategy: strategy.to_string(),
            }),
        }
    }
}

/// Outcome of a simple extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleResult {
    /// The model's reply
    pub description: String,
}

/// Outcome of an advanced extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedResult {
    /// Whether the classification turn answered "yes"
    #[serde(rename = "contains_personal_information")]
    pub contains_target: bool,

    /// Description of the findings, or the classification reply when negative
    pub description: String,

    /// Findings as a record; empty when nothing was found
    pub details: Record,
}

/// Result of an extraction, shaped by the strategy that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExtractionResult {
    /// Single-shot result
    Simple(SimpleResult),
    /// Multi-turn result
    Advanced(AdvancedResult),
}

impl ExtractionResult {
    /// Free-text part of the result
    pub fn description(&self) -> &str {
        match self {
            ExtractionResult::Simple(result) => &result.description,
            ExtractionResult::Advanced(result) => &result.description,
        }
    }

    /// Strategy that produced the result
    pub fn strategy(&self) -> Strategy {
        match self {
            ExtractionResult::Simple(_) => Strategy::Simple,
            ExtractionResult::Advanced(_) => Strategy::Advanced,
        }
    }
}

/// Metadata about an extraction operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    /// Identifier of this request, as shown in logs
    #[serde(with = "request_id_string")]
    pub request_id: RequestId,

    /// Identity of the model that answered
    pub model: String,

    /// Prompt language
    pub language: Language,

    /// Conversation strategy
    pub strategy: Strategy,

    /// Number of model turns issued
    pub model_calls: usize,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Result plus metadata, as returned by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResponse {
    /// Structured verdict
    pub result: ExtractionResult,

    /// Request bookkeeping
    pub metadata: ExtractionMetadata,
}

/// Self-description of the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the annotator
    pub annotator_name: String,

    /// Version of the annotator
    pub version: String,

    /// Languages with at least one registered schema
    pub supported_languages: Vec<Language>,

    /// Strategies with at least one registered schema
    pub supported_strategies: Vec<Strategy>,

    /// Whether identical input yields identical classification
    pub reproducible: bool,
}

mod request_id_string {
    use serde::{Deserialize, Deserializer, Serializer};
    use sift_domain::RequestId;

    pub fn serialize<S: Serializer>(id: &RequestId, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RequestId, D::Error> {
        let s = String::deserialize(deserializer)?;
        RequestId::from_string(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_language_and_strategy_parsing() {
        assert_eq!("EN".parse::<Language>(), Ok(Language::En));
        assert_eq!(" de ".parse::<Language>(), Ok(Language::De));
        assert!("fr".parse::<Language>().is_err());

        assert_eq!("Advanced".parse::<Strategy>(), Ok(Strategy::Advanced));
        assert!("fancy".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_request_parse_rejects_unknown_pairs() {
        let request = ExtractionRequest::parse("text", "en", "simple").unwrap();
        assert_eq!(request.language, Language::En);
        assert_eq!(request.strategy, Strategy::Simple);

        let error = ExtractionRequest::parse("text", "fr", "simple").unwrap_err();
        assert!(matches!(
            error,
            ExtractorError::UnsupportedConfiguration { ref language, .. } if language == "fr"
        ));
    }

    #[test]
    fn test_result_wire_shape() {
        let simple = ExtractionResult::Simple(SimpleResult {
            description: "Line 1 names John Doe".to_string(),
        });
        assert_eq!(
            serde_json::to_value(&simple).unwrap(),
            json!({"type": "simple", "description": "Line 1 names John Doe"})
        );

        let advanced = ExtractionResult::Advanced(AdvancedResult {
            contains_target: false,
            description: "No".to_string(),
            details: Record::new(),
        });
        assert_eq!(
            serde_json::to_value(&advanced).unwrap(),
            json!({
                "type": "advanced",
                "contains_personal_information": false,
                "description": "No",
                "details": {}
            })
        );
    }

    #[test]
    fn test_metadata_round_trip() {
        let metadata = ExtractionMetadata {
            request_id: RequestId::new(),
            model: "mock".to_string(),
            language: Language::De,
            strategy: Strategy::Advanced,
            model_calls: 3,
            processing_time_ms: 12,
        };
        let json = serde_json::to_string(&metadata).unwrap();
        let parsed: ExtractionMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, metadata);
    }
}
