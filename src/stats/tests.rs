use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::constants::Vector;
use crate::embedding::stub_vector;
use crate::scoring::{SampleScore, UnionScorer};
use crate::vocabulary::{StaticVocabularySource, VocabularyEntry, VocabularyPool};

fn scores(values: impl IntoIterator<Item = f64>) -> Vec<SampleScore> {
    values
        .into_iter()
        .map(|v| SampleScore {
            relevance: v,
            divergence: v * 100.0,
        })
        .collect()
}

async fn vector_pool(words: usize) -> VocabularyPool {
    let entries = (0..words)
        .map(|i| {
            let word = format!("word{i}");
            let vector = stub_vector(&word, 16);
            VocabularyEntry::new(word, i as u32 + 1).with_vector(vector)
        })
        .collect();
    let pool = VocabularyPool::default();
    pool.initialize(Arc::new(StaticVocabularySource::new(entries)), true)
        .await
        .expect("initialize");
    pool
}

fn small_config() -> StatsConfig {
    StatsConfig::default()
        .with_bootstrap_samples(50)
        .with_sample_sizes(vec![1, 3, 5])
}

#[test]
fn test_percentile_bounds_with_distinct_samples() {
    let table = NullDistributionTable::from_scores("union", 5, &scores((0..100).map(|i| i as f64)));

    assert_eq!(table.len(), 100);
    assert_eq!(table.percentile(Metric::Relevance, -1.0), 0.0);
    assert!(table.percentile(Metric::Relevance, 99.0) >= 99.0);
    assert_eq!(table.percentile(Metric::Relevance, 1000.0), 100.0);
    assert_eq!(table.percentile(Metric::Relevance, 50.0), 50.0);
}

#[test]
fn test_percentile_is_monotonic() {
    let table = NullDistributionTable::from_scores("union", 3, &scores([0.3, 0.1, 0.2, 0.2, 0.5]));

    let mut previous = 0.0;
    for step in 0..70 {
        let observed = step as f64 / 100.0;
        let p = table.percentile(Metric::Relevance, observed);
        assert!(p >= previous);
        assert!((0.0..=100.0).contains(&p));
        previous = p;
    }
}

#[test]
fn test_table_sorts_and_summarizes() {
    let table = NullDistributionTable::from_scores("union", 2, &scores([3.0, 1.0, 2.0, f64::NAN]));

    assert_eq!(table.samples(Metric::Relevance), &[1.0, 2.0, 3.0]);
    assert_eq!(table.samples(Metric::Divergence), &[100.0, 200.0, 300.0]);

    let summary = table.summary(Metric::Relevance);
    assert!((summary.mean - 2.0).abs() < 1e-12);
    assert!((summary.std_dev - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);
    assert_eq!(summary.min, 1.0);
    assert_eq!(summary.max, 3.0);

    assert!((table.z_score(Metric::Relevance, 2.0)).abs() < 1e-12);
    assert!(table.z_score(Metric::Relevance, 3.0) > 0.0);
}

#[test]
fn test_degenerate_tables() {
    let empty = NullDistributionTable::from_scores("union", 1, &[]);
    assert!(empty.is_empty());
    assert_eq!(empty.percentile(Metric::Relevance, 0.5), 50.0);

    let flat = NullDistributionTable::from_scores("union", 1, &scores([0.4, 0.4]));
    assert_eq!(flat.z_score(Metric::Relevance, 0.9), 0.0);
}

#[tokio::test]
async fn test_bootstrap_random_prompt_draw_count() {
    let pool = vector_pool(30).await;
    let snapshot = pool.snapshot().expect("snapshot");
    let mut rng = StdRng::seed_from_u64(3);

    let result = bootstrap_random_prompt(&snapshot, &UnionScorer, 4, 25, &mut rng).expect("draws");
    assert_eq!(result.len(), 25);
    assert!(result.iter().all(|s| (-1.0..=1.0).contains(&s.relevance)));

    let too_big = bootstrap_random_prompt(&snapshot, &UnionScorer, 29, 1, &mut rng);
    assert!(too_big.is_err());
}

#[test]
fn test_bootstrap_fixed_prompt() {
    let candidates: Vec<Vector> = (0..10)
        .map(|i| Vector::from(stub_vector(&format!("c{i}"), 8)))
        .collect();
    let anchor = stub_vector("anchor", 8);
    let target = stub_vector("target", 8);
    let prompt: [&[f32]; 2] = [&anchor, &target];
    let mut rng = StdRng::seed_from_u64(9);

    let result =
        bootstrap_fixed_prompt(&candidates, &prompt, &UnionScorer, 5, 40, &mut rng).expect("draws");
    assert_eq!(result.len(), 40);

    let err = bootstrap_fixed_prompt(&candidates, &prompt, &UnionScorer, 11, 1, &mut rng);
    assert!(err.is_err());
}

#[tokio::test]
async fn test_statistics_cache_not_ready_before_initialize() {
    let cache = StatisticsCache::new(small_config());

    assert!(!cache.is_initialized());
    assert!(cache.needs_refresh());
    assert!(matches!(
        cache.get_percentile("union", 5, 0.3),
        Err(StatsError::NotReady { sample_size: 5, .. })
    ));
    assert!(matches!(
        cache.get_percentile("unknown", 5, 0.3),
        Err(StatsError::UnknownContext { .. })
    ));
}

#[tokio::test]
async fn test_statistics_cache_initialize_builds_all_tables() {
    let pool = vector_pool(40).await;
    let cache = StatisticsCache::new(small_config());

    cache.initialize(&pool).await.expect("initialize");

    for context in ["union", "radiation"] {
        for size in [1, 3, 5] {
            let table = cache.table(context, size).expect("table");
            assert_eq!(table.len(), 50);
        }
    }
    assert!(cache.table("union", 7).is_none());

    let p = cache.get_percentile("union", 5, 2.0).expect("percentile");
    assert_eq!(p, 100.0);
    let p = cache.get_percentile("union", 5, -2.0).expect("percentile");
    assert_eq!(p, 0.0);
    assert!(cache.get_percentile_for(Metric::Divergence, "radiation", 3, 0.0).is_ok());
    assert!(cache.get_z_score(Metric::Relevance, "union", 1, 0.0).is_ok());

    let stats = cache.stats();
    assert!(stats.initialized);
    assert_eq!(stats.tables.len(), 6);
    assert_eq!(stats.samples_per_table, 50);
}

#[tokio::test]
async fn test_statistics_cache_initialize_is_idempotent_refresh_swaps() {
    let pool = vector_pool(40).await;
    let cache = StatisticsCache::new(small_config());

    cache.initialize(&pool).await.expect("initialize");
    let first = cache.table("union", 3).expect("table");
    cache.initialize(&pool).await.expect("initialize again");
    assert!(Arc::ptr_eq(&first, &cache.table("union", 3).expect("table")));

    cache.refresh(&pool).await.expect("refresh");
    let second = cache.table("union", 3).expect("table");
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.len(), 50);
}

#[tokio::test]
async fn test_statistics_cache_skips_oversized_sample_sizes() {
    let pool = vector_pool(5).await;
    let cache = StatisticsCache::new(small_config());

    cache.initialize(&pool).await.expect("initialize");
    assert!(cache.table("union", 3).is_some());
    assert!(cache.table("union", 5).is_none());
    assert!(cache.table("radiation", 3).is_some());
}

#[tokio::test]
async fn test_statistics_cache_without_vectors_fails() {
    let pool = VocabularyPool::default();
    pool.initialize(Arc::new(StaticVocabularySource::fallback()), true)
        .await
        .expect("initialize");
    let cache = StatisticsCache::new(small_config());

    let err = cache.initialize(&pool).await.unwrap_err();
    assert!(matches!(err, StatsError::Vocabulary(_)));
    assert!(!cache.is_initialized());
}

#[tokio::test]
async fn test_statistics_cache_uninitialized_pool() {
    let pool = VocabularyPool::default();
    let cache = StatisticsCache::new(small_config());
    assert!(matches!(
        cache.initialize(&pool).await,
        Err(StatsError::Vocabulary(crate::vocabulary::VocabularyError::NotInitialized))
    ));
}

#[tokio::test]
async fn test_compute_fallback() {
    let pool = vector_pool(20).await;
    let cache = StatisticsCache::new(small_config());

    let table = cache.compute_fallback(&pool, "radiation", 4, 10).expect("fallback");
    assert_eq!(table.len(), 10);
    assert_eq!(table.sample_size(), 4);
    assert!(cache.table("radiation", 4).is_none());

    assert!(matches!(
        cache.compute_fallback(&pool, "nope", 4, 10),
        Err(StatsError::UnknownContext { .. })
    ));
}

#[tokio::test]
async fn test_clear() {
    let pool = vector_pool(20).await;
    let cache = StatisticsCache::new(small_config());
    cache.initialize(&pool).await.expect("initialize");

    cache.clear();
    assert!(!cache.is_initialized());
}
