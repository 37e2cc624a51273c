use std::time::Duration;

use crate::config::{ConfigError, list_from_env, parse_from_env, secs_from_env};
use crate::constants::{
    DEFAULT_BOOTSTRAP_SAMPLES, DEFAULT_STATS_REFRESH_SECS, DEFAULT_STATS_SAMPLE_SIZES,
};

/// Tuning for the statistics cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsConfig {
    /// Bootstrap draws per table (`B`). Default: `200`.
    pub bootstrap_samples: usize,
    /// Submission sizes to precompute. Default: `1..=7`.
    pub sample_sizes: Vec<usize>,
    /// Age after which the tables are due for rebuild. Default: 30 minutes.
    pub refresh_interval: Duration,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            bootstrap_samples: DEFAULT_BOOTSTRAP_SAMPLES,
            sample_sizes: DEFAULT_STATS_SAMPLE_SIZES.to_vec(),
            refresh_interval: Duration::from_secs(DEFAULT_STATS_REFRESH_SECS),
        }
    }
}

impl StatsConfig {
    const ENV_BOOTSTRAP_SAMPLES: &'static str = "INSIGHT_BOOTSTRAP_SAMPLES";
    const ENV_SAMPLE_SIZES: &'static str = "INSIGHT_STATS_SAMPLE_SIZES";
    const ENV_REFRESH_SECS: &'static str = "INSIGHT_STATS_REFRESH_SECS";

    /// Loads config from environment variables (with defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            bootstrap_samples: parse_from_env(
                Self::ENV_BOOTSTRAP_SAMPLES,
                defaults.bootstrap_samples,
            )?,
            sample_sizes: list_from_env(Self::ENV_SAMPLE_SIZES, defaults.sample_sizes)?,
            refresh_interval: secs_from_env(Self::ENV_REFRESH_SECS, defaults.refresh_interval)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bootstrap_samples == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_BOOTSTRAP_SAMPLES,
                value: "0".to_string(),
                reason: "at least one bootstrap sample is required".to_string(),
            });
        }
        if self.sample_sizes.contains(&0) {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_SAMPLE_SIZES,
                value: format!("{:?}", self.sample_sizes),
                reason: "sample sizes must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn with_bootstrap_samples(mut self, samples: usize) -> Self {
        self.bootstrap_samples = samples;
        self
    }

    pub fn with_sample_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.sample_sizes = sizes;
        self
    }
}
