//! Embedding providers.
//!
//! - [`OpenAiEmbedder`] calls an OpenAI-compatible `/embeddings` endpoint.
//! - [`StubEmbedder`] returns deterministic hash-seeded vectors (no network).
//!
//! Callers should not use providers directly; go through
//! [`crate::cache::EmbeddingCache`].

#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod openai;
mod provider;
pub mod stub;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbedder;
pub use openai::OpenAiEmbedder;
pub use provider::EmbeddingProvider;
pub use stub::{StubEmbedder, stub_vector};
