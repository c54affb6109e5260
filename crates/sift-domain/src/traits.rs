//! Trait definitions for external interactions
//!
//! These traits define the boundary between the extraction protocol and the
//! language-model infrastructure. Implementations live in other crates.

use crate::{Conversation, TokenBias, TokenId};
use serde::{Deserialize, Serialize};

/// Output formatting hint passed to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Ask the backend to constrain the reply to a single JSON object
    JsonObject,
}

/// Generation parameters for one model turn
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionParams {
    /// Upper bound on generated tokens
    pub max_tokens: u32,

    /// Sampling temperature; `None` leaves the backend default
    pub temperature: Option<f32>,

    /// Additive logit bias applied during generation
    pub logit_bias: Option<TokenBias>,

    /// Structured output hint
    pub response_format: Option<ResponseFormat>,
}

impl CompletionParams {
    /// Parameters with a token budget and backend defaults for everything else
    pub fn new(max_tokens: u32) -> Self {
        Self {
            max_tokens,
            temperature: None,
            logit_bias: None,
            response_format: None,
        }
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the logit bias; an empty bias is dropped
    pub fn with_logit_bias(mut self, bias: TokenBias) -> Self {
        self.logit_bias = if bias.is_empty() { None } else { Some(bias) };
        self
    }

    /// Set the structured output hint
    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }
}

/// Trait for language-model backends
///
/// Implemented by the infrastructure layer (sift-llm). Calls are blocking;
/// callers that live on an async runtime move them onto a blocking worker.
pub trait LanguageModel {
    /// Error type for backend operations
    type Error;

    /// Stable identity of the loaded model, used as a cache key for
    /// vocabulary lookups
    fn model_id(&self) -> &str;

    /// Tokenize `text` without start-of-sequence or other special tokens
    fn tokenize(&self, text: &str) -> Result<Vec<TokenId>, Self::Error>;

    /// Produce the next assistant turn for `conversation`
    fn complete(
        &self,
        conversation: &Conversation,
        params: &CompletionParams,
    ) -> Result<String, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_builder() {
        let params = CompletionParams::new(64)
            .with_temperature(0.0)
            .with_response_format(ResponseFormat::JsonObject);

        assert_eq!(params.max_tokens, 64);
        assert_eq!(params.temperature, Some(0.0));
        assert_eq!(params.response_format, Some(ResponseFormat::JsonObject));
        assert!(params.logit_bias.is_none());
    }

    #[test]
    fn test_empty_bias_is_dropped() {
        let params = CompletionParams::new(8).with_logit_bias(TokenBias::new());
        assert!(params.logit_bias.is_none());

        let bias: TokenBias = [(1, 10.0)].into_iter().collect();
        let params = CompletionParams::new(8).with_logit_bias(bias.clone());
        assert_eq!(params.logit_bias, Some(bias));
    }

    #[test]
    fn test_response_format_wire_name() {
        let json = serde_json::to_string(&ResponseFormat::JsonObject).unwrap();
        assert_eq!(json, r#""json_object""#);
    }
}
