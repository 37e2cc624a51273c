use async_trait::async_trait;

use crate::provider::ProviderError;

/// Single-shot chat completion used for assistant suggestions.
///
/// Implementations return the raw reply text; parsing it into words is the
/// caller's job (see [`super::parse_guesses`]). Deadlines are applied by the
/// caller as well.
#[async_trait]
pub trait AssistantProvider: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Sends `prompt` as a single user message and returns the reply text.
    async fn guess(&self, prompt: &str) -> Result<String, ProviderError>;
}
