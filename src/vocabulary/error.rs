use thiserror::Error;

/// Errors from loading or sampling the vocabulary.
#[derive(Debug, Error)]
pub enum VocabularyError {
    /// No snapshot has been loaded yet.
    #[error("vocabulary pool is not initialized")]
    NotInitialized,

    /// A sample asked for more distinct words than the snapshot holds.
    #[error("requested {requested} words but only {available} are available")]
    InsufficientVocabulary { requested: usize, available: usize },

    /// The source returned no usable words.
    #[error("vocabulary source returned no words")]
    EmptySource,

    /// The source failed for a reason other than I/O or parsing.
    #[error("vocabulary source failed: {reason}")]
    Source { reason: String },

    #[error("vocabulary I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSONL line could not be decoded (1-based line number).
    #[error("invalid vocabulary entry on line {line}: {reason}")]
    Parse { line: usize, reason: String },
}
