//! Sift Extractor
//!
//! Detects personal information in a document by holding a short,
//! scripted conversation with a language model.
//!
//! # Overview
//!
//! Two strategies are supported:
//!
//! - **Simple**: one prompt, one reply, returned verbatim as a description.
//! - **Advanced**: a biased yes/no classification turn, and only on "yes" a
//!   free-text description turn followed by a JSON detail turn. The detail
//!   reply is repaired if the model stopped mid-structure.
//!
//! # Architecture
//!
//! ```text
//! ExtractionRequest → ExtractionService → SchemaCatalog → QueryRunner → LanguageModel
//!                                                             ↓
//!                                        ExtractionResponse ← parse_details / repair
//! ```
//!
//! # Example Usage
//!
//! ```
//! use sift_extractor::{
//!     ExtractionRequest, ExtractionResult, ExtractionService, ExtractorConfig, Language,
//!     SchemaCatalog, Strategy,
//! };
//! use sift_llm::MockProvider;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let model = MockProvider::scripted(["Yes", "A full name.", r#"{"refs": ["John Doe"#]);
//! let service = ExtractionService::new(model, SchemaCatalog::builtin(), ExtractorConfig::default())?;
//!
//! let request = ExtractionRequest::new("John Doe wrote this.", Language::En, Strategy::Advanced);
//! let response = service.extract(request).await?;
//!
//! if let ExtractionResult::Advanced(result) = &response.result {
//!     assert!(result.contains_target);
//!     assert_eq!(result.details["refs"][0], "John Doe");
//! }
//! assert_eq!(response.metadata.model_calls, 3);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod parser;
mod prompt;
pub mod repair;
mod runner;
mod schema;
mod service;
mod types;


pub use config::ExtractorConfig;
pub use error::{ExtractorError, Stage};
pub use parser::parse_details;
pub use prompt::{advanced_schema, classification_tokens, simple_schema};
pub use repair::{repair, RepairError};
pub use runner::QueryRunner;
pub use schema::{AdvancedSchema, PromptSchema, SchemaCatalog, SchemaConfig, SimpleSchema};
pub use service::ExtractionService;
pub use types::{
    AdvancedResult, Capabilities, ExtractionMetadata, ExtractionRequest, ExtractionResponse,
    ExtractionResult, Language, Record, SimpleResult, Strategy,
};
