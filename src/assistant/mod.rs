//! Chat-model "assistant" that proposes bridge words between two concepts.

pub mod chat;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod parse;
mod provider;

pub use chat::GenaiAssistant;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockAssistant;
pub use parse::{bridge_prompt, parse_guesses};
pub use provider::AssistantProvider;
