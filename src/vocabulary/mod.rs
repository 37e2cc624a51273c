//! In-memory vocabulary: loading, snapshotting and random sampling.

pub mod config;
pub mod error;
pub mod pool;
pub mod snapshot;
pub mod source;


pub use config::VocabularyConfig;
pub use error::VocabularyError;
pub use pool::{PoolStats, VocabularyPool};
pub use snapshot::{VocabularyEntry, VocabularySnapshot, normalize_word};
pub use source::{
    FALLBACK_WORDS, JsonlVocabularySource, StaticVocabularySource, VocabularySource, parse_jsonl,
};
