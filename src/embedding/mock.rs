//! Counting, failure-injecting embedding provider for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::provider::EmbeddingProvider;
use super::stub::stub_vector;
use crate::provider::ProviderError;

/// Stub vectors plus call accounting.
///
/// `calls()` counts `embed_batch` invocations; `calls_for(text)` counts how
/// many times a given text was sent upstream.
#[derive(Default)]
pub struct MockEmbedder {
    dimension: usize,
    delay: Option<Duration>,
    fail: AtomicBool,
    calls: AtomicUsize,
    per_text: Mutex<HashMap<String, usize>>,
}

impl MockEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            ..Default::default()
        }
    }

    /// Sleeps for `delay` before answering every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Makes every subsequent call fail with an upstream 503.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, text: &str) -> usize {
        self.per_text.lock().get(text).copied().unwrap_or(0)
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        {
            let mut per_text = self.per_text.lock();
            for text in texts {
                *per_text.entry(text.clone()).or_default() += 1;
            }
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(ProviderError::Upstream {
                provider: self.name().to_string(),
                status: 503,
                message: "mock failure".to_string(),
            });
        }

        Ok(texts
            .iter()
            .map(|t| stub_vector(t, self.dimension))
            .collect())
    }
}
