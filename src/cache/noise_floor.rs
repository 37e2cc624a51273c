//! Nearest-neighbour lists ("noise floors") for seed words.
//!
//! A noise floor is the `k` vocabulary words closest to a seed, embedded in
//! its sense context. Computing one costs a provider round trip plus a full
//! vocabulary scan, so finished lists are kept in a [`KeyedCache`].

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::config::NoiseFloorConfig;
use super::embedding::EmbeddingCache;
use super::error::NoiseFloorError;
use super::keyed::KeyedCache;
use super::types::CacheStats;
use crate::scoring::nearest_words;
use crate::vocabulary::{VocabularyPool, normalize_word};

/// One neighbour of the seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseFloorWord {
    pub word: String,
    /// Cosine similarity to the seed, clamped to `[0, 1]`.
    pub similarity: f64,
}

/// Shared, immutable neighbour list.
pub type NoiseFloor = Arc<[NoiseFloorWord]>;

/// Cache key: normalized seed, sorted normalized context, neighbour count.
///
/// Context order does not matter, so `["river", "money"]` and
/// `["money", "river"]` share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NoiseFloorKey {
    seed: String,
    context: Vec<String>,
    k: usize,
}

impl NoiseFloorKey {
    pub fn new<S: AsRef<str>>(seed: &str, context: &[S], k: usize) -> Self {
        let mut context: Vec<String> = context
            .iter()
            .map(|word| normalize_word(word.as_ref()))
            .filter(|word| !word.is_empty())
            .collect();
        context.sort();

        Self {
            seed: normalize_word(seed),
            context,
            k,
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn context(&self) -> &[String] {
        &self.context
    }

    pub fn k(&self) -> usize {
        self.k
    }
}

pub struct NoiseFloorCache {
    cache: KeyedCache<NoiseFloorKey, NoiseFloor>,
}

impl NoiseFloorCache {
    pub fn new(config: &NoiseFloorConfig) -> Self {
        Self {
            cache: KeyedCache::new(config.capacity, config.ttl),
        }
    }

    pub fn get(&self, key: &NoiseFloorKey) -> Option<NoiseFloor> {
        self.cache.get(key)
    }

    pub fn insert(&self, key: NoiseFloorKey, words: Vec<NoiseFloorWord>) -> NoiseFloor {
        let floor = NoiseFloor::from(words);
        self.cache.insert(key, Arc::clone(&floor));
        floor
    }

    /// Cached list for `key`, or the result of `compute` stored under it.
    /// Failures are not cached.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: NoiseFloorKey,
        compute: F,
    ) -> Result<NoiseFloor, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<NoiseFloorWord>, E>>,
    {
        self.cache
            .get_or_compute(key, || async move { compute().await.map(NoiseFloor::from) })
            .await
    }

    /// Noise floor for `seed` in `context`, computing it on a miss.
    #[instrument(skip(self, embeddings, pool, context), fields(context = context.len()))]
    pub async fn noise_floor<S: AsRef<str>>(
        &self,
        embeddings: &EmbeddingCache,
        pool: &VocabularyPool,
        seed: &str,
        context: &[S],
        k: usize,
    ) -> Result<NoiseFloor, NoiseFloorError> {
        let key = NoiseFloorKey::new(seed, context, k);
        let request = key.clone();

        self.get_or_compute(key, || async move {
            debug!(seed = request.seed(), k, "noise floor cache miss");
            compute_noise_floor(embeddings, pool, &request).await
        })
        .await
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl std::fmt::Debug for NoiseFloorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseFloorCache")
            .field("cache", &self.cache)
            .finish()
    }
}

/// Embeds the seed in its context and ranks the current vocabulary against it.
pub async fn compute_noise_floor(
    embeddings: &EmbeddingCache,
    pool: &VocabularyPool,
    key: &NoiseFloorKey,
) -> Result<Vec<NoiseFloorWord>, NoiseFloorError> {
    let seed_vector = embeddings.embed_in_context(key.seed(), key.context()).await?;
    let snapshot = pool.snapshot()?;
    let seed = key.seed().to_string();
    let k = key.k();

    let ranked = tokio::task::spawn_blocking(move || {
        nearest_words(&snapshot, &seed, &seed_vector, k)
    })
    .await
    .map_err(|e| NoiseFloorError::Join(e.to_string()))?;

    Ok(ranked
        .into_iter()
        .map(|candidate| NoiseFloorWord {
            word: candidate.word,
            similarity: candidate.score.clamp(0.0, 1.0),
        })
        .collect())
}
