use async_trait::async_trait;

use crate::provider::ProviderError;

/// Remote (or local) text → vector function.
///
/// Implementations must return exactly one vector per input text, in input
/// order. Callers go through [`crate::cache::EmbeddingCache`], which adds
/// caching and a deadline; providers themselves do neither.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Output dimension of the vectors this provider returns.
    fn dimension(&self) -> usize;

    /// Embeds a batch of texts in one call.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;

    /// Embeds a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| ProviderError::malformed(self.name(), "empty embedding response"))
    }
}
