//! Insight library crate (used by the server and integration tests).
//!
//! Eager precomputation and in-process caching for embedding-scored word
//! tasks. When a task starts, [`PrecomputeOrchestrator::start_precompute`]
//! kicks off the slow work (remote embeddings, an optional assistant call,
//! bootstrap sampling) so that by submit time
//! [`PrecomputeOrchestrator::get_result`] can hand back whatever is ready.
//!
//! # Public API Surface
//!
//! ## Caches
//! - [`KeyedCache`] - generic LRU + TTL map
//! - [`EmbeddingCache`] - embedding lookups with batching and a provider deadline
//! - [`NoiseFloorCache`] - nearest-neighbour lists per seed and context
//! - [`VocabularyPool`] - atomically swapped vocabulary snapshots
//! - [`StatisticsCache`] - bootstrap null distributions and percentile lookup
//!
//! ## Precompute
//! - [`PrecomputeOrchestrator`], [`PrecomputeParams`], [`PartialResult`]
//!
//! ## Providers
//! - [`EmbeddingProvider`], [`AssistantProvider`], [`VocabularySource`],
//!   [`SampleScorer`]
//!
//! ## Wiring
//! - [`InsightServices`] - owns every component, warm-up and maintenance
//! - [`Config`], [`ServiceConfig`] - environment-backed settings
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod assistant;
pub mod cache;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod gateway;
pub mod hashing;
pub mod precompute;
pub mod provider;
pub mod scoring;
pub mod service;
pub mod stats;
pub mod vocabulary;

pub use assistant::{AssistantProvider, GenaiAssistant, bridge_prompt, parse_guesses};
#[cfg(any(test, feature = "mock"))]
pub use assistant::MockAssistant;
pub use cache::{
    CacheConfig, CacheEntry, CacheStats, EmbeddingCache, KeyedCache, NoiseFloor, NoiseFloorCache,
    NoiseFloorConfig, NoiseFloorError, NoiseFloorKey, NoiseFloorWord,
};
pub use config::{Config, ConfigError};
pub use constants::{CONTEXT_RADIATION, CONTEXT_UNION, Vector};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbedder;
pub use embedding::{EmbeddingProvider, OpenAiEmbedder, StubEmbedder, stub_vector};
pub use gateway::create_router;
pub use precompute::{
    CapacityPolicy, JobStatus, OrchestratorStats, PartialResult, PrecomputeConfig,
    PrecomputeError, PrecomputeJob, PrecomputeOrchestrator, PrecomputeParams, ResultField,
    StartOutcome,
};
pub use provider::ProviderError;
pub use scoring::{
    LexicalCandidate, RadiationScorer, SampleScore, SampleScorer, UnionScorer, cosine_similarity,
    lexical_union, nearest_words,
};
pub use service::{HealthReport, InsightServices, ServiceConfig};
pub use stats::{Metric, NullDistributionTable, StatisticsCache, StatsConfig, StatsError};
pub use vocabulary::{
    JsonlVocabularySource, PoolStats, StaticVocabularySource, VocabularyConfig, VocabularyEntry,
    VocabularyError, VocabularyPool, VocabularySnapshot, VocabularySource,
};
