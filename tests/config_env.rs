//! Environment-backed component configuration.

use std::env;
use std::time::Duration;

use insight::ServiceConfig;
use insight::precompute::CapacityPolicy;
use serial_test::serial;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

#[test]
#[serial]
fn test_service_config_defaults() {
    let config = ServiceConfig::from_env().expect("defaults");

    assert_eq!(config.cache.capacity, 10_000);
    assert_eq!(config.cache.ttl, Duration::from_secs(3600));
    assert_eq!(config.noise_floor.capacity, 1000);
    assert_eq!(config.noise_floor.ttl, Duration::from_secs(3600));
    assert_eq!(config.stats.bootstrap_samples, 200);
    assert_eq!(config.stats.sample_sizes, vec![1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(config.precompute.max_jobs, 1000);
    assert_eq!(config.precompute.capacity_policy, CapacityPolicy::EvictOldest);
    assert_eq!(config.precompute.assistant_timeout, Duration::from_secs(15));
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_service_config_overrides() {
    with_env_vars(
        &[
            ("INSIGHT_EMBEDDING_CACHE_CAPACITY", "50"),
            ("INSIGHT_BOOTSTRAP_SAMPLES", "1000"),
            ("INSIGHT_STATS_SAMPLE_SIZES", "3, 5"),
            ("INSIGHT_CAPACITY_POLICY", "reject"),
            ("INSIGHT_MAX_JOBS", "7"),
            ("INSIGHT_ASSISTANT_TIMEOUT_MS", "250"),
            ("INSIGHT_VOCABULARY_REFRESH_SECS", "90"),
        ],
        || {
            let config = ServiceConfig::from_env().expect("overrides");

            assert_eq!(config.cache.capacity, 50);
            assert_eq!(config.stats.bootstrap_samples, 1000);
            assert_eq!(config.stats.sample_sizes, vec![3, 5]);
            assert_eq!(config.precompute.capacity_policy, CapacityPolicy::Reject);
            assert_eq!(config.precompute.max_jobs, 7);
            assert_eq!(config.precompute.assistant_timeout, Duration::from_millis(250));
            assert_eq!(config.vocabulary.refresh_interval, Duration::from_secs(90));
        },
    );
}

#[test]
#[serial]
fn test_service_config_rejects_bad_values() {
    with_env_vars(&[("INSIGHT_CAPACITY_POLICY", "lru")], || {
        let err = ServiceConfig::from_env().expect_err("bad policy");
        assert!(err.to_string().contains("INSIGHT_CAPACITY_POLICY"), "{err}");
    });

    with_env_vars(&[("INSIGHT_MAX_JOBS", "many")], || {
        assert!(ServiceConfig::from_env().is_err());
    });
}

#[test]
#[serial]
fn test_noise_floor_cache_overrides_and_rejects_zero() {
    with_env_vars(
        &[
            ("INSIGHT_NOISE_FLOOR_CACHE_CAPACITY", "25"),
            ("INSIGHT_NOISE_FLOOR_CACHE_TTL_SECS", "120"),
        ],
        || {
            let config = ServiceConfig::from_env().expect("overrides");
            assert_eq!(config.noise_floor.capacity, 25);
            assert_eq!(config.noise_floor.ttl, Duration::from_secs(120));
        },
    );

    with_env_vars(&[("INSIGHT_NOISE_FLOOR_CACHE_CAPACITY", "0")], || {
        assert!(ServiceConfig::from_env().is_err());
    });
}
