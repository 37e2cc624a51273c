use thiserror::Error;

use crate::provider::ProviderError;
use crate::vocabulary::VocabularyError;

/// Why a noise floor could not be computed.
#[derive(Debug, Error)]
pub enum NoiseFloorError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),

    /// The ranking task panicked or was cancelled.
    #[error("noise floor ranking failed: {0}")]
    Join(String),
}
