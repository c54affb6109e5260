//! Sift LLM Backend Layer
//!
//! Language-model backends for the extraction protocol.
//!
//! # Architecture
//!
//! This crate provides implementations of the `LanguageModel` trait from
//! `sift-domain`, plus the per-model token cache used to turn classification
//! words into logit-bias ids.
//!
//! # Backends
//!
//! - `MockProvider`: Scripted, deterministic backend for testing
//! - `LlamaCppProvider`: llama.cpp-compatible HTTP server
//!
//! # Examples
//!
//! ```
//! use sift_domain::{CompletionParams, Conversation, LanguageModel, Message};
//! use sift_llm::MockProvider;
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let conversation = Conversation::new().with(Message::user("hi"));
//! let reply = provider.complete(&conversation, &CompletionParams::new(16)).unwrap();
//! assert_eq!(reply, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod llama_cpp;
pub mod token_cache;

use sift_domain::{CompletionParams, Conversation, LanguageModel, TokenId};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub use llama_cpp::{LlamaCppConfig, LlamaCppProvider};
pub use token_cache::TokenCache;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// One `complete` call as seen by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Conversation passed to the backend
    pub conversation: Conversation,

    /// Generation parameters passed to the backend
    pub params: CompletionParams,
}

#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Error(String),
}

/// Mock LLM provider for deterministic testing
///
/// Replies are served from a FIFO script; once the script is exhausted the
/// default reply is returned. Every call is recorded so tests can assert on
/// the exact conversation and parameters the protocol produced.
///
/// Tokenization maps each byte of the input to its own id unless a
/// vocabulary entry has been registered for the exact string.
///
/// # Examples
///
/// ```
/// use sift_domain::{CompletionParams, Conversation, LanguageModel};
/// use sift_llm::MockProvider;
///
/// let provider = MockProvider::default();
/// provider.push_response("first");
/// provider.push_response("second");
///
/// let params = CompletionParams::new(8);
/// let conversation = Conversation::new();
/// assert_eq!(provider.complete(&conversation, &params).unwrap(), "first");
/// assert_eq!(provider.complete(&conversation, &params).unwrap(), "second");
/// assert_eq!(provider.call_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    model_id: String,
    default_response: String,
    script: Arc<Mutex<VecDeque<Scripted>>>,
    vocabulary: Arc<Mutex<HashMap<String, Vec<TokenId>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    tokenize_count: Arc<Mutex<usize>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockProvider {
    /// Create a new MockProvider with a fixed default reply
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            model_id: "mock".to_string(),
            default_response: response.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            vocabulary: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            tokenize_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Create a mock that serves `replies` in order
    pub fn scripted<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::default();
        for reply in replies {
            provider.push_response(reply);
        }
        provider
    }

    /// Set the model identity reported by `model_id`
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Queue a reply for the next unanswered call
    pub fn push_response(&self, response: impl Into<String>) {
        lock(&self.script).push_back(Scripted::Reply(response.into()));
    }

    /// Queue a backend failure for the next unanswered call
    pub fn push_error(&self, message: impl Into<String>) {
        lock(&self.script).push_back(Scripted::Error(message.into()));
    }

    /// Register the ids `tokenize` returns for an exact string
    pub fn add_vocabulary(&self, token: impl Into<String>, ids: Vec<TokenId>) {
        lock(&self.vocabulary).insert(token.into(), ids);
    }

    /// Number of `complete` calls so far
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Number of `tokenize` calls so far
    pub fn tokenize_count(&self) -> usize {
        *lock(&self.tokenize_count)
    }

    /// All recorded `complete` calls, oldest first
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LanguageModel for MockProvider {
    type Error = LlmError;

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn tokenize(&self, text: &str) -> Result<Vec<TokenId>, Self::Error> {
        *lock(&self.tokenize_count) += 1;

        if let Some(ids) = lock(&self.vocabulary).get(text) {
            return Ok(ids.clone());
        }
        Ok(text.bytes().map(TokenId::from).collect())
    }

    fn complete(
        &self,
        conversation: &Conversation,
        params: &CompletionParams,
    ) -> Result<String, Self::Error> {
        lock(&self.calls).push(RecordedCall {
            conversation: conversation.clone(),
            params: params.clone(),
        });

        match lock(&self.script).pop_front() {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::Error(message)) => Err(LlmError::Other(message)),
            None => Ok(self.default_response.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_domain::Message;

    fn conversation() -> Conversation {
        Conversation::new().with(Message::user("prompt"))
    }

    #[test]
    fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.complete(&conversation(), &CompletionParams::new(4));
        assert_eq!(result.unwrap(), "Test response");
    }

    #[test]
    fn test_mock_provider_script_then_default() {
        let provider = MockProvider::scripted(["one", "two"]);
        let params = CompletionParams::new(4);

        assert_eq!(provider.complete(&conversation(), &params).unwrap(), "one");
        assert_eq!(provider.complete(&conversation(), &params).unwrap(), "two");
        assert_eq!(
            provider.complete(&conversation(), &params).unwrap(),
            "Default mock response"
        );
    }

    #[test]
    fn test_mock_provider_error() {
        let provider = MockProvider::default();
        provider.push_error("backend exploded");

        let result = provider.complete(&conversation(), &CompletionParams::new(4));
        assert!(matches!(result, Err(LlmError::Other(m)) if m == "backend exploded"));
    }

    #[test]
    fn test_mock_provider_records_calls() {
        let provider = MockProvider::new("ok");
        let params = CompletionParams::new(64).with_temperature(0.0);
        provider.complete(&conversation(), &params).unwrap();

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].params, params);
        assert_eq!(calls[0].conversation, conversation());
    }

    #[test]
    fn test_mock_provider_tokenize() {
        let provider = MockProvider::default();
        provider.add_vocabulary("Yes", vec![3869]);

        assert_eq!(provider.tokenize("Yes").unwrap(), vec![3869]);
        assert_eq!(provider.tokenize("No").unwrap(), vec![78, 111]);
        assert_eq!(provider.tokenize_count(), 2);
    }

    #[test]
    fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1
            .complete(&conversation(), &CompletionParams::new(4))
            .unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }
}
