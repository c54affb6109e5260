//! Token bias - additive logit weights keyed by vocabulary id

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Vocabulary id as assigned by a specific model's tokenizer
pub type TokenId = u32;

/// Mapping from vocabulary id to additive logit bias
///
/// Ids are model-specific, so a bias is only meaningful for the model whose
/// tokenizer produced them. Serializes as a JSON object keyed by the id,
/// which is the shape OpenAI-compatible chat backends accept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenBias(BTreeMap<TokenId, f32>);

impl TokenBias {
    /// Create an empty bias
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the same weight to every id in `ids`
    ///
    /// Later insertions overwrite earlier weights for the same id.
    pub fn insert_all(&mut self, ids: impl IntoIterator<Item = TokenId>, weight: f32) {
        for id in ids {
            self.0.insert(id, weight);
        }
    }

    /// Weight registered for `id`
    pub fn get(&self, id: TokenId) -> Option<f32> {
        self.0.get(&id).copied()
    }

    /// Number of biased ids
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no id is biased
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(id, weight)` pairs in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (TokenId, f32)> + '_ {
        self.0.iter().map(|(id, weight)| (*id, *weight))
    }
}

impl FromIterator<(TokenId, f32)> for TokenBias {
    fn from_iter<I: IntoIterator<Item = (TokenId, f32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
