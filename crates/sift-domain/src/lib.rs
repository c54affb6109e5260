//! Sift Domain Layer
//!
//! This crate holds the vocabulary shared by every other Sift crate: the
//! role-tagged messages that make up a conversation with a language model,
//! token biases, request identifiers, and the trait through which the
//! extraction protocol talks to a model backend.
//!
//! ## Key Concepts
//!
//! - **Message**: one immutable, role-tagged turn
//! - **Conversation**: an ordered, append-only sequence of messages
//! - **TokenBias**: additive logit weights keyed by vocabulary id
//! - **LanguageModel**: the backend capability (tokenize, complete)
//!
//! ## Architecture
//!
//! - Pure data and trait definitions only
//! - Backend implementations live in `sift-llm`
//! - The extraction protocol lives in `sift-extractor`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bias;
pub mod conversation;
pub mod message;
pub mod request_id;
pub mod traits;

// Re-exports for convenience
pub use bias::{TokenBias, TokenId};
pub use conversation::Conversation;
pub use message::{Message, Role};
pub use request_id::RequestId;
pub use traits::{CompletionParams, LanguageModel, ResponseFormat};
