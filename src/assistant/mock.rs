//! Scripted assistant for tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::provider::AssistantProvider;
use crate::provider::ProviderError;

/// Returns a canned reply, counts calls and can be made slow, failing or
/// panicking.
pub struct MockAssistant {
    reply: Mutex<String>,
    delay: Option<Duration>,
    fail: AtomicBool,
    panic: AtomicBool,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockAssistant {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: Mutex::new(reply.into()),
            delay: None,
            fail: AtomicBool::new(false),
            panic: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A mock that fails every call with an upstream 500.
    pub fn failing() -> Self {
        let mock = Self::new("");
        mock.set_failing(true);
        mock
    }

    /// A mock whose `guess` panics, for exercising task-boundary handling.
    pub fn panicking() -> Self {
        let mock = Self::new("");
        mock.panic.store(true, Ordering::SeqCst);
        mock
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_reply(&self, reply: impl Into<String>) {
        *self.reply.lock() = reply.into();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl AssistantProvider for MockAssistant {
    fn name(&self) -> &str {
        "mock-assistant"
    }

    async fn guess(&self, prompt: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.panic.load(Ordering::SeqCst) {
            panic!("mock assistant panicked");
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(ProviderError::Upstream {
                provider: self.name().to_string(),
                status: 500,
                message: "mock failure".to_string(),
            });
        }

        Ok(self.reply.lock().clone())
    }
}
