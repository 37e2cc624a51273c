use std::time::Duration;

use crate::config::{ConfigError, millis_from_env, parse_from_env, secs_from_env};
use crate::constants::{
    DEFAULT_EMBEDDING_CACHE_CAPACITY, DEFAULT_EMBEDDING_CACHE_TTL_SECS,
    DEFAULT_NOISE_FLOOR_CAPACITY, DEFAULT_NOISE_FLOOR_TTL_SECS, DEFAULT_PROVIDER_TIMEOUT_MS,
};

/// Tuning for the embedding cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of cached vectors. Default: `10_000`.
    pub capacity: usize,
    /// Lifetime of a cached vector, counted from insertion. Default: one hour.
    pub ttl: Duration,
    /// Deadline for a single provider call on a miss. Default: 10s.
    pub provider_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_EMBEDDING_CACHE_CAPACITY,
            ttl: Duration::from_secs(DEFAULT_EMBEDDING_CACHE_TTL_SECS),
            provider_timeout: Duration::from_millis(DEFAULT_PROVIDER_TIMEOUT_MS),
        }
    }
}

impl CacheConfig {
    const ENV_CAPACITY: &'static str = "INSIGHT_EMBEDDING_CACHE_CAPACITY";
    const ENV_TTL_SECS: &'static str = "INSIGHT_EMBEDDING_CACHE_TTL_SECS";
    const ENV_PROVIDER_TIMEOUT_MS: &'static str = "INSIGHT_PROVIDER_TIMEOUT_MS";

    /// Loads config from environment variables (with defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            capacity: parse_from_env(Self::ENV_CAPACITY, defaults.capacity)?,
            ttl: secs_from_env(Self::ENV_TTL_SECS, defaults.ttl)?,
            provider_timeout: millis_from_env(
                Self::ENV_PROVIDER_TIMEOUT_MS,
                defaults.provider_timeout,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_CAPACITY,
                value: "0".to_string(),
                reason: "cache capacity must be positive".to_string(),
            });
        }
        if self.ttl.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_TTL_SECS,
                value: "0".to_string(),
                reason: "cache TTL must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }
}

/// Tuning for the noise-floor cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseFloorConfig {
    /// Maximum number of cached neighbour lists. Default: `1_000`.
    pub capacity: usize,
    /// Lifetime of a cached list. Default: one hour.
    pub ttl: Duration,
}

impl Default for NoiseFloorConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_NOISE_FLOOR_CAPACITY,
            ttl: Duration::from_secs(DEFAULT_NOISE_FLOOR_TTL_SECS),
        }
    }
}

impl NoiseFloorConfig {
    const ENV_CAPACITY: &'static str = "INSIGHT_NOISE_FLOOR_CACHE_CAPACITY";
    const ENV_TTL_SECS: &'static str = "INSIGHT_NOISE_FLOOR_CACHE_TTL_SECS";

    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            capacity: parse_from_env(Self::ENV_CAPACITY, defaults.capacity)?,
            ttl: secs_from_env(Self::ENV_TTL_SECS, defaults.ttl)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_CAPACITY,
                value: "0".to_string(),
                reason: "noise floor cache capacity must be positive".to_string(),
            });
        }
        if self.ttl.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_TTL_SECS,
                value: "0".to_string(),
                reason: "noise floor cache TTL must be positive".to_string(),
            });
        }
        Ok(())
    }
}
