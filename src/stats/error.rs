use thiserror::Error;

use crate::vocabulary::VocabularyError;

/// Errors from building or querying null distributions.
#[derive(Debug, Error)]
pub enum StatsError {
    /// No table exists yet for this context and sample size.
    #[error("null distribution for {context}/{sample_size} is not ready")]
    NotReady { context: String, sample_size: usize },

    /// No scorer is registered under this context key.
    #[error("unknown scoring context: {context}")]
    UnknownContext { context: String },

    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),

    /// The blocking build task panicked or was cancelled.
    #[error("bootstrap task failed: {0}")]
    Join(String),
}
