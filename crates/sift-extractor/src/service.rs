//! Extraction service: request validation, schema lookup and scheduling

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::runner::QueryRunner;
use crate::schema::SchemaCatalog;
use crate::types::{
    Capabilities, ExtractionMetadata, ExtractionRequest, ExtractionResponse, Language, Strategy,
};
use sift_domain::{LanguageModel, RequestId};
use sift_llm::TokenCache;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

const ANNOTATOR_NAME: &str = "sift";

/// Runs extraction requests against one language model
///
/// The service is cheap to share behind an `Arc`: schemas, the token cache
/// and the configuration are read-only, and access to the model is bounded
/// by a semaphore sized from `max_concurrent_requests`.
pub struct ExtractionService<L: LanguageModel> {
    model: Arc<L>,
    catalog: Arc<SchemaCatalog>,
    token_cache: Arc<TokenCache>,
    config: Arc<ExtractorConfig>,
    permits: Arc<Semaphore>,
}

impl<L> ExtractionService<L>
where
    L: LanguageModel + Send + Sync + 'static,
    L::Error: Display,
{
    /// Create a service over `model`
    ///
    /// Fails if the configuration does not validate.
    pub fn new(model: L, catalog: SchemaCatalog, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;

        Ok(Self {
            model: Arc::new(model),
            catalog: Arc::new(catalog),
            token_cache: Arc::new(TokenCache::new()),
            permits: Arc::new(Semaphore::new(config.max_concurrent_requests)),
            config: Arc::new(config),
        })
    }

    /// The token cache used for classification bias
    pub fn token_cache(&self) -> &Arc<TokenCache> {
        &self.token_cache
    }

    /// Describe what this service can do
    pub fn capabilities(&self) -> Capabilities {
        let pairs = self.catalog.pairs();

        let mut supported_languages: Vec<Language> = pairs.iter().map(|(l, _)| *l).collect();
        supported_languages.dedup();
        let mut supported_strategies: Vec<Strategy> = pairs.iter().map(|(_, s)| *s).collect();
        supported_strategies.sort();
        supported_strategies.dedup();

        Capabilities {
            annotator_name: ANNOTATOR_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            supported_languages,
            supported_strategies,
            reproducible: self.config.classification_temperature == 0.0,
        }
    }

    /// Run one extraction
    ///
    /// The request is rejected before any model call if the text is empty or
    /// too long, or if no schema is registered for its language and strategy.
    pub async fn extract(&self, request: ExtractionRequest) -> Result<ExtractionResponse, ExtractorError> {
        let request_id = RequestId::new();

        if request.text.trim().is_empty() {
            return Err(ExtractorError::InvalidRequest("text must not be empty".to_string()));
        }
        let length = request.text.chars().count();
        if length > self.config.max_text_length {
            return Err(ExtractorError::TextTooLong(length, self.config.max_text_length));
        }

        let schema = self.catalog.lookup(request.language, request.strategy)?;

        info!(
            request_id = %request_id,
            language = %request.language,
            strategy = %request.strategy,
            text_length = length,
            "starting extraction"
        );

        // Held by the blocking worker so it outlives a cancelled caller.
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| ExtractorError::Runtime(e.to_string()))?;
        debug!(request_id = %request_id, "acquired model permit");

        let start = Instant::now();
        let model = Arc::clone(&self.model);
        let token_cache = Arc::clone(&self.token_cache);
        let config = Arc::clone(&self.config);
        let text = request.text;

        let (outcome, model_calls) = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let mut runner = QueryRunner::new(model.as_ref(), token_cache.as_ref(), config.as_ref());
            let outcome = runner.run(&schema, &text);
            (outcome, runner.model_calls())
        })
        .await
        .map_err(|e| ExtractorError::Runtime(e.to_string()))?;

        let processing_time_ms = start.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    request_id = %request_id,
                    stage = e.stage().map(|s| s.as_str()).unwrap_or("none"),
                    model_calls,
                    error = %e,
                    "extraction failed"
                );
                return Err(e);
            }
        };

        info!(
            request_id = %request_id,
            model_calls,
            processing_time_ms,
            "extraction complete"
        );

        Ok(ExtractionResponse {
            result,
            metadata: ExtractionMetadata {
                request_id,
                model: self.model.model_id().to_string(),
                language: request.language,
                strategy: request.strategy,
                model_calls,
                processing_time_ms,
            },
        })
    }
}
