//! Cross-cutting, shared constants.
//!
//! These are defaults for the config structs in each module. Override them at
//! runtime through the `INSIGHT_*` environment variables rather than editing
//! them here.

use std::sync::Arc;

/// Shared, immutable embedding vector.
///
/// Vectors are handed out by the embedding cache, the vocabulary snapshot and
/// the precompute result bag; an `Arc<[f32]>` keeps those hand-outs cheap.
pub type Vector = Arc<[f32]>;

/// Output dimension of `text-embedding-3-small`.
pub const DEFAULT_EMBEDDING_DIM: usize = 1536;

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub const DEFAULT_EMBEDDING_CACHE_CAPACITY: usize = 10_000;
pub const DEFAULT_EMBEDDING_CACHE_TTL_SECS: u64 = 60 * 60;
pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 10_000;

pub const DEFAULT_NOISE_FLOOR_CAPACITY: usize = 1_000;
pub const DEFAULT_NOISE_FLOOR_TTL_SECS: u64 = 60 * 60;
/// Neighbours returned for a seed when the caller does not say.
pub const DEFAULT_NOISE_FLOOR_K: usize = 20;

pub const DEFAULT_VOCABULARY_REFRESH_SECS: u64 = 60 * 60;

pub const DEFAULT_BOOTSTRAP_SAMPLES: usize = 200;
pub const DEFAULT_STATS_SAMPLE_SIZES: [usize; 7] = [1, 2, 3, 4, 5, 6, 7];
pub const DEFAULT_STATS_REFRESH_SECS: u64 = 30 * 60;

pub const DEFAULT_JOB_TTL_SECS: u64 = 30 * 60;
pub const DEFAULT_MAX_JOBS: usize = 1_000;
pub const DEFAULT_ASSISTANT_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_NULL_BOOTSTRAP_SAMPLES: usize = 100;
pub const DEFAULT_NULL_POOL_DRAW: usize = 200;
pub const DEFAULT_LEXICAL_TOP_K: usize = 5;
pub const DEFAULT_SUGGESTION_COUNT: usize = 5;
pub const DEFAULT_SUBMISSION_SIZE: usize = 5;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Context key of the two-prompt-word (anchor/target) instrument.
pub const CONTEXT_UNION: &str = "union";
/// Context key of the single-seed instrument.
pub const CONTEXT_RADIATION: &str = "radiation";

/// Minimum vector-bearing words the null-sample draw needs before it is
/// considered meaningful.
pub const MIN_NULL_POOL_DRAW: usize = 50;
