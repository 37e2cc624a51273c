//! Deterministic embedder for running without credentials.

use async_trait::async_trait;
use tracing::debug;

use super::provider::EmbeddingProvider;
use crate::hashing::hash_to_u64;
use crate::provider::ProviderError;

/// Hash-seeded unit vectors: the same text always maps to the same vector.
///
/// Vectors carry no semantics, so scores computed from them are noise. Use it
/// for local runs and tests only.
#[derive(Debug, Clone)]
pub struct StubEmbedder {
    dimension: usize,
}

impl StubEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    /// Computes the stub vector synchronously.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        stub_vector(text, self.dimension)
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    fn name(&self) -> &str {
        "stub"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        debug!(count = texts.len(), "Generating stub embeddings");
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }
}

/// Deterministic, L2-normalized pseudo-random vector for `text`.
pub fn stub_vector(text: &str, dimension: usize) -> Vec<f32> {
    let mut state = hash_to_u64(text.as_bytes());
    let mut embedding = Vec::with_capacity(dimension);

    for _ in 0..dimension {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let value = ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0;
        embedding.push(value);
    }

    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut embedding {
            *x /= norm;
        }
    }

    embedding
}
