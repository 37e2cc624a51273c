use async_trait::async_trait;
use genai::Client;
use genai::chat::{ChatMessage, ChatRequest};
use tracing::{debug, error};

use super::provider::AssistantProvider;
use crate::provider::ProviderError;

/// [`AssistantProvider`] backed by the `genai` multi-provider client.
///
/// The model name selects the upstream (`gpt-*`, `claude-*`, `gemini-*`, ...);
/// credentials come from the provider's usual environment variable.
pub struct GenaiAssistant {
    client: Client,
    model: String,
}

impl GenaiAssistant {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::default(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl AssistantProvider for GenaiAssistant {
    fn name(&self) -> &str {
        "assistant"
    }

    async fn guess(&self, prompt: &str) -> Result<String, ProviderError> {
        debug!(model = %self.model, "Requesting assistant suggestions");
        let request = ChatRequest::new(vec![ChatMessage::user(prompt)]);

        let response = self
            .client
            .exec_chat(&self.model, request, None)
            .await
            .map_err(|e| {
                error!("Assistant provider error: {}", e);
                ProviderError::transport(self.name(), e.to_string())
            })?;

        response
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| ProviderError::malformed(self.name(), "reply has no text content"))
    }
}

impl std::fmt::Debug for GenaiAssistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenaiAssistant")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}
