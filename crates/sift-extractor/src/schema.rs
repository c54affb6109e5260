//! Prompt schemas: the locale strings that parameterize a conversation
//!
//! A schema is plain data for one (language, strategy) pair plus two
//! behaviors: building the opening turns for a document and naming the
//! classification tokens worth biasing. Schemas are built once, wrapped in
//! `Arc`, and shared read-only by every request.

use crate::error::ExtractorError;
use crate::prompt;
use crate::types::{Language, Strategy};
use serde::{Deserialize, Serialize};
use sift_domain::{Conversation, Message};
use std::collections::HashMap;
use std::sync::Arc;

/// Prompts for the single-shot strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleSchema {
    /// System turn
    pub system: String,
    /// Line placed before the document
    pub prefix: String,
    /// Line placed after the document
    pub suffix: String,
}

impl SimpleSchema {
    /// System turn, then one user turn of prefix, trimmed text and suffix
    pub fn initial(&self, text: &str) -> Conversation {
        Conversation::new()
            .with(Message::system(self.system.as_str()))
            .with(Message::user(
                [self.prefix.as_str(), text.trim(), self.suffix.as_str()].join("\n"),
            ))
    }
}

/// Prompts for the classify / describe / detail strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedSchema {
    /// System turn with role description and step-by-step instructions
    pub system: String,
    /// Yes/no question asked after the document
    pub text_contains_indicator_prompt: String,
    /// Assistant turn recorded after a positive classification
    pub indicator_yes_acknowledgement: String,
    /// Request for a free-text description of the findings
    pub description_prompt: String,
    /// Request for the findings as JSON
    pub details_prompt: String,
    /// Word whose presence in the classification reply means "yes"
    pub token_yes: String,
    /// Word for "no"; only used to bias the classification turn
    pub token_no: Option<String>,
}

impl AdvancedSchema {
    /// System turn, the trimmed document, then the classification question
    pub fn initial(&self, text: &str) -> Conversation {
        Conversation::new()
            .with(Message::system(self.system.as_str()))
            .with(Message::user(text.trim()))
            .with(Message::user(self.text_contains_indicator_prompt.as_str()))
    }

    /// Classification tokens to bias
    pub fn tokens(&self) -> Vec<&str> {
        std::iter::once(self.token_yes.as_str())
            .chain(self.token_no.as_deref())
            .collect()
    }
}

/// Schema for one strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSchema {
    /// Single-shot prompts
    Simple(SimpleSchema),
    /// Multi-turn prompts
    Advanced(AdvancedSchema),
}

impl PromptSchema {
    /// Strategy the schema drives
    pub fn strategy(&self) -> Strategy {
        match self {
            PromptSchema::Simple(_) => Strategy::Simple,
            PromptSchema::Advanced(_) => Strategy::Advanced,
        }
    }

    /// System turn text
    pub fn system(&self) -> &str {
        match self {
            PromptSchema::Simple(schema) => &schema.system,
            PromptSchema::Advanced(schema) => &schema.system,
        }
    }

    /// Opening turns for a fresh extraction of `text`
    pub fn initial(&self, text: &str) -> Conversation {
        match self {
            PromptSchema::Simple(schema) => schema.initial(text),
            PromptSchema::Advanced(schema) => schema.initial(text),
        }
    }

    /// Classification tokens; empty for strategies that do not classify
    pub fn tokens(&self) -> Vec<&str> {
        match self {
            PromptSchema::Simple(_) => Vec::new(),
            PromptSchema::Advanced(schema) => schema.tokens(),
        }
    }
}

/// A schema as written in a configuration file
///
/// Which fields are required depends on `strategy`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Language the schema is registered under
    pub language: String,
    /// Strategy the schema is registered under
    pub strategy: String,
    /// System turn
    pub system: String,
    /// Simple: line before the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Simple: line after the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    /// Advanced: classification question
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_contains_indicator_prompt: Option<String>,
    /// Advanced: positive acknowledgement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicator_yes_acknowledgement: Option<String>,
    /// Advanced: description request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_prompt: Option<String>,
    /// Advanced: JSON detail request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details_prompt: Option<String>,
    /// Advanced: "yes" token; defaults to the language's built-in token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_yes: Option<String>,
    /// Advanced: "no" token; defaults to the language's built-in token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_no: Option<String>,
}

fn required(value: Option<String>, field: &str, config: &SchemaConfig) -> Result<String, ExtractorError> {
    value.ok_or_else(|| {
        ExtractorError::Config(format!(
            "schema {}/{} is missing '{}'",
            config.language, config.strategy, field
        ))
    })
}

impl SchemaConfig {
    /// Resolve into a language and a typed schema
    pub fn into_schema(self) -> Result<(Language, PromptSchema), ExtractorError> {
        let (language, strategy) = match (Language::parse(&self.language), Strategy::parse(&self.strategy)) {
            (Some(language), Some(strategy)) => (language, strategy),
            _ => {
                return Err(ExtractorError::UnsupportedConfiguration {
                    language: self.language,
                    strategy: self.strategy,
                })
            }
        };

        let schema = match strategy {
            Strategy::Simple => PromptSchema::Simple(SimpleSchema {
                prefix: required(self.prefix.clone(), "prefix", &self)?,
                suffix: required(self.suffix.clone(), "suffix", &self)?,
                system: self.system,
            }),
            Strategy::Advanced => {
                let (default_yes, default_no) = prompt::classification_tokens(language);
                PromptSchema::Advanced(AdvancedSchema {
                    text_contains_indicator_prompt: required(
                        self.text_contains_indicator_prompt.clone(),
                        "text_contains_indicator_prompt",
                        &self,
                    )?,
                    indicator_yes_acknowledgement: required(
                        self.indicator_yes_acknowledgement.clone(),
                        "indicator_yes_acknowledgement",
                        &self,
                    )?,
                    description_prompt: required(
                        self.description_prompt.clone(),
                        "description_prompt",
                        &self,
                    )?,
                    details_prompt: required(self.details_prompt.clone(), "details_prompt", &self)?,
                    token_yes: self.token_yes.unwrap_or_else(|| default_yes.to_string()),
                    token_no: self.token_no.or_else(|| Some(default_no.to_string())),
                    system: self.system,
                })
            }
        };

        Ok((language, schema))
    }
}

/// Lookup table from (language, strategy) to schema
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    schemas: HashMap<(Language, Strategy), Arc<PromptSchema>>,
}

impl SchemaCatalog {
    /// Catalog with no schemas
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalog with the built-in English and German schemas for both strategies
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for language in Language::ALL {
            catalog.insert(language, PromptSchema::Simple(prompt::simple_schema(language)));
            catalog.insert(language, PromptSchema::Advanced(prompt::advanced_schema(language)));
        }
        catalog
    }

    /// Register `schema` for `language`, replacing any previous entry
    pub fn insert(&mut self, language: Language, schema: PromptSchema) {
        self.schemas
            .insert((language, schema.strategy()), Arc::new(schema));
    }

    /// Apply schemas from configuration on top of the current entries
    pub fn apply(&mut self, configs: impl IntoIterator<Item = SchemaConfig>) -> Result<(), ExtractorError> {
        for config in configs {
            let (language, schema) = config.into_schema()?;
            self.insert(language, schema);
        }
        Ok(())
    }

    /// Schema for the pair, if registered
    pub fn get(&self, language: Language, strategy: Strategy) -> Option<Arc<PromptSchema>> {
        self.schemas.get(&(language, strategy)).cloned()
    }

    /// Schema for the pair, or an unsupported-configuration error
    pub fn lookup(&self, language: Language, strategy: Strategy) -> Result<Arc<PromptSchema>, ExtractorError> {
        self.get(language, strategy)
            .ok_or_else(|| ExtractorError::UnsupportedConfiguration {
                language: language.to_string(),
                strategy: strategy.to_string(),
            })
    }

    /// Registered pairs in a stable order
    pub fn pairs(&self) -> Vec<(Language, Strategy)> {
        let mut pairs: Vec<_> = self.schemas.keys().copied().collect();
        pairs.sort();
        pairs
    }

    /// Number of registered schemas
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether no schema is registered
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
