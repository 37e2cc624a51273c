use std::time::Duration;

use crate::config::{ConfigError, secs_from_env};
use crate::constants::DEFAULT_VOCABULARY_REFRESH_SECS;

/// Tuning for the vocabulary pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyConfig {
    /// Age after which a snapshot is due for reload. Default: one hour.
    pub refresh_interval: Duration,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(DEFAULT_VOCABULARY_REFRESH_SECS),
        }
    }
}

impl VocabularyConfig {
    const ENV_REFRESH_SECS: &'static str = "INSIGHT_VOCABULARY_REFRESH_SECS";

    /// Loads config from environment variables (with defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            refresh_interval: secs_from_env(Self::ENV_REFRESH_SECS, defaults.refresh_interval)?,
        })
    }
}
