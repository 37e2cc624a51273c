use std::time::Duration;

use crate::config::{ConfigError, millis_from_env, parse_from_env, secs_from_env};
use crate::constants::{
    DEFAULT_ASSISTANT_TIMEOUT_MS, DEFAULT_JOB_TTL_SECS, DEFAULT_LEXICAL_TOP_K, DEFAULT_MAX_JOBS,
    DEFAULT_NULL_BOOTSTRAP_SAMPLES, DEFAULT_NULL_POOL_DRAW, DEFAULT_SWEEP_INTERVAL_SECS,
};

/// What `start_precompute` does when the job map is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapacityPolicy {
    /// Drop the oldest job by start time, whatever its status.
    #[default]
    EvictOldest,
    /// Drop the oldest finished job; refuse the new one if every job is still running.
    Reject,
}

impl std::str::FromStr for CapacityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "evict-oldest" | "evict_oldest" | "evict" => Ok(Self::EvictOldest),
            "reject" => Ok(Self::Reject),
            _ => Err(format!("Unknown capacity policy: {}", s)),
        }
    }
}

/// Tuning for the precompute orchestrator and its sub-tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecomputeConfig {
    /// How long a finished job is kept. Default: 30 minutes.
    pub job_ttl: Duration,
    /// Maximum retained jobs. Default: `1000`.
    pub max_jobs: usize,
    pub capacity_policy: CapacityPolicy,
    /// Deadline for the assistant call. Default: 15s.
    pub assistant_timeout: Duration,
    /// Bootstrap draws in a job's null-sample table. Default: `100`.
    pub null_bootstrap_samples: usize,
    /// Vector-bearing words drawn as the null-sample candidate pool. Default: `200`.
    pub null_pool_draw: usize,
    /// Size of the lexical baseline. Default: `5`.
    pub lexical_top_k: usize,
    /// Period of the background sweep. Default: 60s.
    pub sweep_interval: Duration,
}

impl Default for PrecomputeConfig {
    fn default() -> Self {
        Self {
            job_ttl: Duration::from_secs(DEFAULT_JOB_TTL_SECS),
            max_jobs: DEFAULT_MAX_JOBS,
            capacity_policy: CapacityPolicy::default(),
            assistant_timeout: Duration::from_millis(DEFAULT_ASSISTANT_TIMEOUT_MS),
            null_bootstrap_samples: DEFAULT_NULL_BOOTSTRAP_SAMPLES,
            null_pool_draw: DEFAULT_NULL_POOL_DRAW,
            lexical_top_k: DEFAULT_LEXICAL_TOP_K,
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

impl PrecomputeConfig {
    const ENV_JOB_TTL_SECS: &'static str = "INSIGHT_JOB_TTL_SECS";
    const ENV_MAX_JOBS: &'static str = "INSIGHT_MAX_JOBS";
    const ENV_CAPACITY_POLICY: &'static str = "INSIGHT_CAPACITY_POLICY";
    const ENV_ASSISTANT_TIMEOUT_MS: &'static str = "INSIGHT_ASSISTANT_TIMEOUT_MS";
    const ENV_NULL_BOOTSTRAP_SAMPLES: &'static str = "INSIGHT_NULL_BOOTSTRAP_SAMPLES";
    const ENV_NULL_POOL_DRAW: &'static str = "INSIGHT_NULL_POOL_DRAW";
    const ENV_LEXICAL_TOP_K: &'static str = "INSIGHT_LEXICAL_TOP_K";
    const ENV_SWEEP_INTERVAL_SECS: &'static str = "INSIGHT_SWEEP_INTERVAL_SECS";

    /// Loads config from environment variables (with defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let d = Self::default();

        let config = Self {
            job_ttl: secs_from_env(Self::ENV_JOB_TTL_SECS, d.job_ttl)?,
            max_jobs: parse_from_env(Self::ENV_MAX_JOBS, d.max_jobs)?,
            capacity_policy: parse_from_env(Self::ENV_CAPACITY_POLICY, d.capacity_policy)?,
            assistant_timeout: millis_from_env(Self::ENV_ASSISTANT_TIMEOUT_MS, d.assistant_timeout)?,
            null_bootstrap_samples: parse_from_env(
                Self::ENV_NULL_BOOTSTRAP_SAMPLES,
                d.null_bootstrap_samples,
            )?,
            null_pool_draw: parse_from_env(Self::ENV_NULL_POOL_DRAW, d.null_pool_draw)?,
            lexical_top_k: parse_from_env(Self::ENV_LEXICAL_TOP_K, d.lexical_top_k)?,
            sweep_interval: secs_from_env(Self::ENV_SWEEP_INTERVAL_SECS, d.sweep_interval)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            (Self::ENV_MAX_JOBS, self.max_jobs),
            (Self::ENV_NULL_BOOTSTRAP_SAMPLES, self.null_bootstrap_samples),
            (Self::ENV_NULL_POOL_DRAW, self.null_pool_draw),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    name,
                    value: "0".to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        }
        if self.sweep_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_SWEEP_INTERVAL_SECS,
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
