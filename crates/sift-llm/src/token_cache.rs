//! Per-model cache of tokenized classification words
//!
//! Vocabulary ids are a pure function of the model's tokenizer, so once a
//! word has been tokenized for a model the result never changes. The cache
//! is keyed by `LanguageModel::model_id` and then by the word.
//!
//! Lookups take a read lock. On a miss the word is tokenized with no lock
//! held and the result is inserted under a short write lock; two requests
//! racing on the same word both tokenize it and insert identical ids.

use sift_domain::{LanguageModel, TokenBias, TokenId};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

type Vocabulary = HashMap<String, Vec<TokenId>>;

/// Shared, read-mostly cache from `(model, word)` to vocabulary ids
#[derive(Debug, Default)]
pub struct TokenCache {
    models: RwLock<HashMap<String, Vocabulary>>,
}

impl TokenCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Vocabulary>> {
        self.models.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Vocabulary>> {
        self.models.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cached ids for `token` under `model_id`, without tokenizing
    pub fn get(&self, model_id: &str, token: &str) -> Option<Vec<TokenId>> {
        self.read()
            .get(model_id)
            .and_then(|vocabulary| vocabulary.get(token))
            .cloned()
    }

    /// Vocabulary ids of `token` for `model`, tokenizing on first use
    pub fn resolve<M: LanguageModel>(
        &self,
        model: &M,
        token: &str,
    ) -> Result<Vec<TokenId>, M::Error> {
        if let Some(ids) = self.get(model.model_id(), token) {
            return Ok(ids);
        }

        let ids = model.tokenize(token)?;
        debug!(model = model.model_id(), token, ids = ?ids, "resolved token ids");

        self.write()
            .entry(model.model_id().to_string())
            .or_default()
            .entry(token.to_string())
            .or_insert_with(|| ids.clone());

        Ok(ids)
    }

    /// Bias every id of every word in `tokens` by `weight`
    pub fn bias_for<M, S>(
        &self,
        model: &M,
        tokens: &[S],
        weight: f32,
    ) -> Result<TokenBias, M::Error>
    where
        M: LanguageModel,
        S: AsRef<str>,
    {
        let mut bias = TokenBias::new();
        for token in tokens {
            bias.insert_all(self.resolve(model, token.as_ref())?, weight);
        }
        Ok(bias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockProvider;
    use std::sync::Arc;

    #[test]
    fn test_resolve_caches_per_model() {
        let cache = TokenCache::new();
        let model = MockProvider::default().with_model_id("model-a");
        model.add_vocabulary("Yes", vec![9454]);

        let first = cache.resolve(&model, "Yes").unwrap();
        let second = cache.resolve(&model, "Yes").unwrap();

        assert_eq!(first, vec![9454]);
        assert_eq!(first, second);
        assert_eq!(model.tokenize_count(), 1);
        assert_eq!(cache.get("model-a", "Yes"), Some(vec![9454]));
    }

    #[test]
    fn test_models_do_not_share_entries() {
        let cache = TokenCache::new();
        let a = MockProvider::default().with_model_id("a");
        let b = MockProvider::default().with_model_id("b");
        a.add_vocabulary("Ja", vec![1]);
        b.add_vocabulary("Ja", vec![2]);

        assert_eq!(cache.resolve(&a, "Ja").unwrap(), vec![1]);
        assert_eq!(cache.resolve(&b, "Ja").unwrap(), vec![2]);

        assert_eq!(cache.get("a", "Ja"), Some(vec![1]));
        assert_eq!(cache.get("b", "Ja"), Some(vec![2]));
        assert_eq!(cache.get("c", "Ja"), None);
    }

    #[test]
    fn test_bias_for_covers_all_ids() {
        let cache = TokenCache::new();
        let model = MockProvider::default();
        model.add_vocabulary("Yes", vec![10, 11]);
        model.add_vocabulary("No", vec![12]);

        let bias = cache.bias_for(&model, &["Yes", "No"], 10.0).unwrap();
        assert_eq!(bias.len(), 3);
        assert!(bias.iter().all(|(_, weight)| weight == 10.0));
    }

    #[test]
    fn test_concurrent_resolution_is_consistent() {
        let cache = Arc::new(TokenCache::new());
        let model = MockProvider::default().with_model_id("shared");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let model = model.clone();
                std::thread::spawn(move || cache.resolve(&model, "Nein").unwrap())
            })
            .collect();

        let results: Vec<Vec<TokenId>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(cache.get("shared", "Nein"), Some(results[0].clone()));
    }
}
