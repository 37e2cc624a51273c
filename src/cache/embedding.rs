//! Text → vector cache in front of an [`EmbeddingProvider`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use super::config::CacheConfig;
use super::keyed::KeyedCache;
use super::types::CacheStats;
use crate::constants::Vector;
use crate::embedding::EmbeddingProvider;
use crate::provider::{ProviderError, call_with_timeout};

/// Memoizes embeddings by normalized text.
///
/// Keys are trimmed and lowercased, and the provider is sent the normalized
/// text, so `"Ocean "` and `"ocean"` share one vector.
pub struct EmbeddingCache {
    cache: KeyedCache<String, Vector>,
    provider: Arc<dyn EmbeddingProvider>,
    provider_timeout: Duration,
}

impl EmbeddingCache {
    pub fn new(config: &CacheConfig, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            cache: KeyedCache::new(config.capacity, config.ttl),
            provider,
            provider_timeout: config.provider_timeout,
        }
    }

    /// Canonical cache key for `text`.
    pub fn normalize_key(text: &str) -> String {
        text.trim().to_lowercase()
    }

    /// Text used for a word embedded against its surrounding words.
    pub fn context_text(word: &str, context: &[String]) -> String {
        if context.is_empty() {
            word.to_string()
        } else {
            format!("{} (in context: {})", word, context.join(", "))
        }
    }

    /// Cached vector for `text`, without calling the provider.
    pub fn get(&self, text: &str) -> Option<Vector> {
        self.cache.get(Self::normalize_key(text).as_str())
    }

    /// Returns the vector for `text`, calling the provider on a miss.
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn embed(&self, text: &str) -> Result<Vector, ProviderError> {
        let key = Self::normalize_key(text);
        let request = key.clone();

        self.cache
            .get_or_compute(key, || async move {
                debug!(text = %request, "embedding cache miss");
                let vector = call_with_timeout(
                    self.provider.name(),
                    self.provider_timeout,
                    self.provider.embed(&request),
                )
                .await?;
                Ok(Vector::from(vector))
            })
            .await
    }

    /// Returns one vector per input, in input order.
    ///
    /// All misses are resolved with a single deduplicated provider call; the
    /// whole batch fails if that call fails.
    #[instrument(skip_all, fields(provider = self.provider.name(), count = texts.len()))]
    pub async fn embed_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
    ) -> Result<Vec<Vector>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = texts
            .iter()
            .map(|t| Self::normalize_key(t.as_ref()))
            .collect();
        let mut resolved = self.cache.get_batch(&keys);

        let mut missing: Vec<String> = Vec::new();
        for key in &keys {
            if !resolved.contains_key(key) && !missing.contains(key) {
                missing.push(key.clone());
            }
        }

        if !missing.is_empty() {
            debug!(hits = resolved.len(), misses = missing.len(), "embedding batch");
            let fetched = self.fetch(&missing).await?;
            for (key, vector) in missing.into_iter().zip(fetched) {
                self.cache.insert(key.clone(), vector.clone());
                resolved.insert(key, vector);
            }
        }

        keys.iter()
            .map(|key| {
                resolved.get(key).cloned().ok_or_else(|| {
                    ProviderError::malformed(self.provider.name(), "missing vector in batch")
                })
            })
            .collect()
    }

    /// Embeds `word` disambiguated by `context`, cached under the composed text.
    pub async fn embed_in_context(
        &self,
        word: &str,
        context: &[String],
    ) -> Result<Vector, ProviderError> {
        self.embed(&Self::context_text(word, context)).await
    }

    /// Returns whichever of `texts` are cached, keyed by normalized text.
    pub fn cached(&self, texts: &[String]) -> HashMap<String, Vector> {
        let keys: Vec<String> = texts.iter().map(|t| Self::normalize_key(t)).collect();
        self.cache.get_batch(&keys)
    }

    pub fn purge_expired(&self) -> usize {
        self.cache.purge_expired()
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn dimension(&self) -> usize {
        self.provider.dimension()
    }

    async fn fetch(&self, texts: &[String]) -> Result<Vec<Vector>, ProviderError> {
        let vectors = call_with_timeout(
            self.provider.name(),
            self.provider_timeout,
            self.provider.embed_batch(texts),
        )
        .await?;

        if vectors.len() != texts.len() {
            return Err(ProviderError::malformed(
                self.provider.name(),
                format!("expected {} vectors, got {}", texts.len(), vectors.len()),
            ));
        }

        Ok(vectors.into_iter().map(Vector::from).collect())
    }
}

impl std::fmt::Debug for EmbeddingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingCache")
            .field("provider", &self.provider.name())
            .field("cache", &self.cache)
            .field("provider_timeout", &self.provider_timeout)
            .finish()
    }
}
