//! Turn-by-turn driver of one extraction
//!
//! Simple: `Start -> SingleShot -> Done`.
//!
//! Advanced: `Start -> Classifying -> Elaborating -> DetailingJson -> Done`,
//! with a short-circuit from `Classifying` straight to `Done` when the
//! classification reply does not contain the schema's "yes" word. Any
//! failed turn ends the run with an error naming the stage.
//!
//! Turns are issued strictly one after the other: each one depends on the
//! reply to the previous one.

use crate::config::ExtractorConfig;
use crate::error::{ExtractorError, Stage};
use crate::parser::parse_details;
use crate::schema::{AdvancedSchema, PromptSchema, SimpleSchema};
use crate::types::{AdvancedResult, ExtractionResult, Record, SimpleResult};
use sift_domain::{CompletionParams, Conversation, LanguageModel, Message, ResponseFormat};
use sift_llm::TokenCache;
use std::fmt::Display;
use tracing::{debug, info};

/// Where an advanced run currently stands
#[derive(Debug)]
enum AdvancedState {
    Classifying,
    Elaborating,
    DetailingJson { description: String },
    Done(AdvancedResult),
}

impl AdvancedState {
    fn name(&self) -> &'static str {
        match self {
            AdvancedState::Classifying => "classifying",
            AdvancedState::Elaborating => "elaborating",
            AdvancedState::DetailingJson { .. } => "detailing_json",
            AdvancedState::Done(_) => "done",
        }
    }
}

/// Drives the conversation for a single extraction request
///
/// A runner and the conversation it builds belong to exactly one request;
/// create a fresh one per request.
pub struct QueryRunner<'a, L: LanguageModel> {
    model: &'a L,
    token_cache: &'a TokenCache,
    config: &'a ExtractorConfig,
    model_calls: usize,
}

impl<'a, L> QueryRunner<'a, L>
where
    L: LanguageModel,
    L::Error: Display,
{
    /// Create a runner over a model, its token cache and the protocol settings
    pub fn new(model: &'a L, token_cache: &'a TokenCache, config: &'a ExtractorConfig) -> Self {
        Self {
            model,
            token_cache,
            config,
            model_calls: 0,
        }
    }

    /// Number of model turns issued so far
    pub fn model_calls(&self) -> usize {
        self.model_calls
    }

    /// Run the protocol that matches the schema's strategy
    pub fn run(&mut self, schema: &PromptSchema, text: &str) -> Result<ExtractionResult, ExtractorError> {
        match schema {
            PromptSchema::Simple(schema) => self.run_simple(schema, text).map(ExtractionResult::Simple),
            PromptSchema::Advanced(schema) => {
                self.run_advanced(schema, text).map(ExtractionResult::Advanced)
            }
        }
    }

    /// One turn; the reply is returned as the description
    pub fn run_simple(&mut self, schema: &SimpleSchema, text: &str) -> Result<SimpleResult, ExtractorError> {
        debug!(state = "single_shot", "advancing simple extraction");

        let conversation = schema.initial(text);
        let params = CompletionParams::new(self.config.simple_max_tokens)
            .with_response_format(ResponseFormat::JsonObject);
        let description = self.query(&conversation, &params, Stage::SingleShot)?;

        Ok(SimpleResult { description })
    }

    /// Classify, then describe and detail only when the answer is "yes"
    pub fn run_advanced(
        &mut self,
        schema: &AdvancedSchema,
        text: &str,
    ) -> Result<AdvancedResult, ExtractorError> {
        let mut conversation = schema.initial(text);
        let mut state = AdvancedState::Classifying;

        loop {
            debug!(state = state.name(), "advancing advanced extraction");

            state = match state {
                AdvancedState::Classifying => {
                    let reply = self.classify(schema, &conversation)?;

                    if !contains_ignore_case(&reply, &schema.token_yes) {
                        info!(verdict = "negative", "classification complete");
                        AdvancedState::Done(AdvancedResult {
                            contains_target: false,
                            description: reply,
                            details: Record::new(),
                        })
                    } else {
                        info!(verdict = "positive", "classification complete");
                        conversation.push(Message::assistant(
                            schema.indicator_yes_acknowledgement.as_str(),
                        ));
                        conversation.push(Message::user(schema.description_prompt.as_str()));
                        AdvancedState::Elaborating
                    }
                }
                AdvancedState::Elaborating => {
                    let params = CompletionParams::new(self.config.elaboration_max_tokens);
                    let description = self.query(&conversation, &params, Stage::Elaboration)?;

                    conversation.push(Message::assistant(description.as_str()));
                    conversation.push(Message::user(schema.details_prompt.as_str()));
                    AdvancedState::DetailingJson { description }
                }
                AdvancedState::DetailingJson { description } => {
                    let params = CompletionParams::new(self.config.details_max_tokens)
                        .with_response_format(ResponseFormat::JsonObject);
                    let reply = self.query(&conversation, &params, Stage::DetailExtraction)?;

                    let details = parse_details(&reply).map_err(|source| {
                        ExtractorError::Unparseable {
                            stage: Stage::DetailExtraction,
                            source,
                        }
                    })?;

                    AdvancedState::Done(AdvancedResult {
                        contains_target: true,
                        description,
                        details,
                    })
                }
                AdvancedState::Done(result) => return Ok(result),
            };
        }
    }

    fn classify(&mut self, schema: &AdvancedSchema, conversation: &Conversation) -> Result<String, ExtractorError> {
        let bias = self
            .token_cache
            .bias_for(self.model, &schema.tokens(), self.config.classification_bias)
            .map_err(|e| ExtractorError::backend(Stage::Classification)(e.to_string()))?;

        let params = CompletionParams::new(self.config.classification_max_tokens)
            .with_temperature(self.config.classification_temperature)
            .with_logit_bias(bias);

        self.query(conversation, &params, Stage::Classification)
    }

    fn query(
        &mut self,
        conversation: &Conversation,
        params: &CompletionParams,
        stage: Stage,
    ) -> Result<String, ExtractorError> {
        debug!(
            stage = %stage,
            turns = conversation.len(),
            max_tokens = params.max_tokens,
            "issuing model turn"
        );

        self.model_calls += 1;
        let reply = self
            .model
            .complete(conversation, params)
            .map_err(|e| ExtractorError::backend(stage)(e.to_string()))?;

        Ok(reply.trim().to_string())
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
