//! llama.cpp Server Backend
//!
//! Talks to a llama.cpp-compatible HTTP server: `/tokenize` for vocabulary
//! lookups and the OpenAI-compatible `/v1/chat/completions` endpoint for
//! generation. Logit bias, temperature and the JSON response format are
//! forwarded as-is.
//!
//! The client is blocking. Construct it outside of an async context and call
//! it from a blocking worker.
//!
//! # Examples
//!
//! ```no_run
//! use sift_llm::LlamaCppProvider;
//!
//! let provider = LlamaCppProvider::new("http://localhost:8080", "llama-3-8b-instruct")?;
//! # Ok::<(), sift_llm::LlmError>(())
//! ```

use crate::LlmError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sift_domain::{
    CompletionParams, Conversation, LanguageModel, Message, ResponseFormat, TokenBias, TokenId,
};
use std::time::Duration;
use tracing::debug;

/// Default llama.cpp server endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080";

/// Default timeout for a single backend request (2 minutes)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Connection settings for a llama.cpp server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlamaCppConfig {
    /// Server base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name sent with each request; also the token cache key
    #[serde(default = "default_model")]
    pub model: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    "default".to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for LlamaCppConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Backend for a llama.cpp-compatible HTTP server
pub struct LlamaCppProvider {
    endpoint: String,
    model: String,
    client: reqwest::blocking::Client,
}

#[derive(Serialize)]
struct TokenizeRequest<'a> {
    content: &'a str,
    add_special: bool,
}

#[derive(Deserialize)]
struct TokenizeResponse {
    tokens: Vec<TokenId>,
}

#[derive(Serialize)]
struct ResponseFormatBody {
    #[serde(rename = "type")]
    kind: ResponseFormat,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    logit_bias: Option<&'a TokenBias>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormatBody>,
}

impl<'a> ChatCompletionRequest<'a> {
    fn new(model: &'a str, conversation: &'a Conversation, params: &'a CompletionParams) -> Self {
        Self {
            model,
            messages: conversation.messages(),
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            logit_bias: params.logit_bias.as_ref(),
            response_format: params
                .response_format
                .map(|kind| ResponseFormatBody { kind }),
        }
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl ChatCompletionResponse {
    fn into_text(self) -> Result<String, LlmError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("response has no message content".to_string()))
    }
}

impl LlamaCppProvider {
    /// Create a provider with the default timeout
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(endpoint, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a provider with an explicit per-request timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Communication(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
        })
    }

    /// Create a provider from configuration
    pub fn from_config(config: &LlamaCppConfig) -> Result<Self, LlmError> {
        Self::with_timeout(
            config.endpoint.clone(),
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Server base URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn post<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, LlmError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.endpoint, path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Communication(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        response
            .json::<Resp>()
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }
}

impl LanguageModel for LlamaCppProvider {
    type Error = LlmError;

    fn model_id(&self) -> &str {
        &self.model
    }

    fn tokenize(&self, text: &str) -> Result<Vec<TokenId>, Self::Error> {
        let request = TokenizeRequest {
            content: text,
            add_special: false,
        };
        let response: TokenizeResponse = self.post("/tokenize", &request)?;
        Ok(response.tokens)
    }

    fn complete(
        &self,
        conversation: &Conversation,
        params: &CompletionParams,
    ) -> Result<String, Self::Error> {
        debug!(
            model = %self.model,
            turns = conversation.len(),
            max_tokens = params.max_tokens,
            "requesting chat completion"
        );

        let request = ChatCompletionRequest::new(&self.model, conversation, params);
        let response: ChatCompletionResponse = self.post("/v1/chat/completions", &request)?;
        response.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_creation() {
        let provider = LlamaCppProvider::new("http://localhost:8080/", "llama").unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:8080");
        assert_eq!(provider.model_id(), "llama");
    }

    #[test]
    fn test_config_defaults_from_toml() {
        let config: LlamaCppConfig = toml::from_str(r#"model = "mistral""#).unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.model, "mistral");
    }

    #[test]
    fn test_config_model_defaults_from_toml() {
        let config: LlamaCppConfig = toml::from_str(r#"endpoint = "http://gpu-box:8081""#).unwrap();
        assert_eq!(config.endpoint, "http://gpu-box:8081");
        assert_eq!(config, LlamaCppConfig {
            endpoint: "http://gpu-box:8081".to_string(),
            ..Default::default()
        });
    }

    #[test]
    fn test_chat_request_body() {
        let conversation = Conversation::new()
            .with(Message::system("sys"))
            .with(Message::user("text"));
        let bias: TokenBias = [(9454, 10.0)].into_iter().collect();
        let params = CompletionParams::new(64)
            .with_temperature(0.0)
            .with_logit_bias(bias)
            .with_response_format(ResponseFormat::JsonObject);

        let body = serde_json::to_value(ChatCompletionRequest::new("m", &conversation, &params))
            .unwrap();

        assert_eq!(
            body,
            json!({
                "model": "m",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "text"}
                ],
                "max_tokens": 64,
                "temperature": 0.0,
                "logit_bias": {"9454": 10.0},
                "response_format": {"type": "json_object"}
            })
        );
    }

    #[test]
    fn test_chat_request_omits_unset_options() {
        let conversation = Conversation::new().with(Message::user("text"));
        let params = CompletionParams::new(512);

        let body = serde_json::to_value(ChatCompletionRequest::new("m", &conversation, &params))
            .unwrap();
        let object = body.as_object().unwrap();

        assert!(!object.contains_key("temperature"));
        assert!(!object.contains_key("logit_bias"));
        assert!(!object.contains_key("response_format"));
    }

    #[test]
    fn test_response_text_extraction() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "Yes"}}]
        }))
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "Yes");

        let empty: ChatCompletionResponse =
            serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(empty.into_text(), Err(LlmError::InvalidResponse(_))));
    }

    #[test]
    fn test_unreachable_server_is_communication_error() {
        let provider = LlamaCppProvider::new("http://localhost:99999", "llama").unwrap();
        let result = provider.tokenize("Yes");
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }

    // Integration test (requires a running llama.cpp server)
    #[test]
    #[ignore]
    fn test_llama_cpp_integration() {
        let provider = LlamaCppProvider::new(DEFAULT_ENDPOINT, "default").unwrap();
        let ids = provider.tokenize("Yes").unwrap();
        assert!(!ids.is_empty());

        let conversation = Conversation::new().with(Message::user("Say 'hello' and nothing else"));
        let reply = provider
            .complete(&conversation, &CompletionParams::new(16).with_temperature(0.0))
            .unwrap();
        assert!(!reply.is_empty());
    }
}
