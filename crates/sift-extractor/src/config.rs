//! Configuration for the Extractor

use serde::{Deserialize, Serialize};

/// Configuration for the extraction protocol
///
/// Missing keys in TOML fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum input text length (characters)
    pub max_text_length: usize,

    /// Token budget of the single simple-strategy turn
    pub simple_max_tokens: u32,

    /// Token budget of the yes/no classification turn
    pub classification_max_tokens: u32,

    /// Token budget of the free-text description turn
    pub elaboration_max_tokens: u32,

    /// Token budget of the JSON detail turn
    pub details_max_tokens: u32,

    /// Sampling temperature of the classification turn
    pub classification_temperature: f32,

    /// Logit bias added to every classification token id
    pub classification_bias: f32,

    /// Extractions allowed to talk to the model at the same time
    pub max_concurrent_requests: usize,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        let budgets = [
            ("simple_max_tokens", self.simple_max_tokens),
            ("classification_max_tokens", self.classification_max_tokens),
            ("elaboration_max_tokens", self.elaboration_max_tokens),
            ("details_max_tokens", self.details_max_tokens),
        ];
        for (name, budget) in budgets {
            if budget == 0 {
                return Err(format!("{} must be greater than 0", name));
            }
        }
        let temperature = self.classification_temperature;
        if temperature.is_nan() || temperature < 0.0 {
            return Err("classification_temperature must be non-negative".to_string());
        }
        if !self.classification_bias.is_finite() {
            return Err("classification_bias must be finite".to_string());
        }
        if self.max_concurrent_requests == 0 {
            return Err("max_concurrent_requests must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_text_length: 50_000,
            simple_max_tokens: 1024,
            classification_max_tokens: 64,
            elaboration_max_tokens: 512,
            details_max_tokens: 512,
            classification_temperature: 0.0,
            classification_bias: 10.0,
            max_concurrent_requests: 1,
        }
    }
}
