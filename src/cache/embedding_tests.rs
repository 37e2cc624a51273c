use std::sync::Arc;
use std::time::Duration;

use super::config::CacheConfig;
use super::embedding::EmbeddingCache;
use crate::embedding::{MockEmbedder, stub_vector};

const DIM: usize = 8;

fn cache_with(mock: Arc<MockEmbedder>, config: CacheConfig) -> EmbeddingCache {
    EmbeddingCache::new(&config, mock)
}

#[test]
fn test_normalize_key() {
    assert_eq!(EmbeddingCache::normalize_key("  Ocean "), "ocean");
    assert_eq!(EmbeddingCache::normalize_key("FOREST"), "forest");
}

#[test]
fn test_context_text() {
    assert_eq!(EmbeddingCache::context_text("bank", &[]), "bank");
    assert_eq!(
        EmbeddingCache::context_text("bank", &["river".to_string(), "money".to_string()]),
        "bank (in context: river, money)"
    );
}

#[tokio::test]
async fn test_embed_miss_then_hit() {
    let mock = Arc::new(MockEmbedder::new(DIM));
    let cache = cache_with(mock.clone(), CacheConfig::default());

    let first = cache.embed("ocean").await.expect("embed");
    let second = cache.embed("  OCEAN").await.expect("embed");

    assert_eq!(&*first, stub_vector("ocean", DIM).as_slice());
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(mock.calls(), 1);
    assert_eq!(mock.calls_for("ocean"), 1);

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[tokio::test]
async fn test_embed_failure_is_not_cached() {
    let mock = Arc::new(MockEmbedder::new(DIM));
    let cache = cache_with(mock.clone(), CacheConfig::default());

    mock.set_failing(true);
    let err = cache.embed("ocean").await.expect_err("provider is failing");
    assert!(matches!(
        err,
        crate::provider::ProviderError::Upstream { status: 503, .. }
    ));
    assert!(cache.get("ocean").is_none());

    mock.set_failing(false);
    cache.embed("ocean").await.expect("recovered");
    assert_eq!(mock.calls_for("ocean"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_embed_times_out() {
    let mock = Arc::new(MockEmbedder::new(DIM).with_delay(Duration::from_secs(5)));
    let config = CacheConfig::default().with_provider_timeout(Duration::from_millis(100));
    let cache = cache_with(mock, config);

    let err = cache.embed("ocean").await.expect_err("should time out");
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_embed_batch_single_call_for_misses() {
    let mock = Arc::new(MockEmbedder::new(DIM));
    let cache = cache_with(mock.clone(), CacheConfig::default());
    cache.embed("ocean").await.expect("warm");

    let texts = ["forest", "Ocean", "desert", "forest"];
    let vectors = cache.embed_batch(&texts).await.expect("batch");

    assert_eq!(vectors.len(), 4);
    assert_eq!(&*vectors[0], stub_vector("forest", DIM).as_slice());
    assert_eq!(&*vectors[1], stub_vector("ocean", DIM).as_slice());
    assert_eq!(&*vectors[2], stub_vector("desert", DIM).as_slice());
    assert!(Arc::ptr_eq(&vectors[0], &vectors[3]));

    assert_eq!(mock.calls(), 2);
    assert_eq!(mock.calls_for("forest"), 1);
    assert_eq!(mock.calls_for("ocean"), 1);
}

#[tokio::test]
async fn test_embed_batch_all_hits_skips_provider() {
    let mock = Arc::new(MockEmbedder::new(DIM));
    let cache = cache_with(mock.clone(), CacheConfig::default());
    cache.embed_batch(&["a", "b"]).await.expect("warm");

    cache.embed_batch(&["b", "a"]).await.expect("hits");
    assert_eq!(mock.calls(), 1);
}

#[tokio::test]
async fn test_embed_batch_empty() {
    let mock = Arc::new(MockEmbedder::new(DIM));
    let cache = cache_with(mock.clone(), CacheConfig::default());

    let empty: [&str; 0] = [];
    assert!(cache.embed_batch(&empty).await.expect("empty").is_empty());
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn test_embed_in_context_uses_composed_key() {
    let mock = Arc::new(MockEmbedder::new(DIM));
    let cache = cache_with(mock.clone(), CacheConfig::default());
    let context = vec!["river".to_string()];

    let in_context = cache.embed_in_context("bank", &context).await.expect("embed");
    let bare = cache.embed("bank").await.expect("embed");

    assert_ne!(&*in_context, &*bare);
    assert_eq!(mock.calls_for("bank (in context: river)"), 1);
    assert!(cache.get("bank (in context: river)").is_some());
}

#[tokio::test]
async fn test_embedding_cache_capacity_evicts() {
    let mock = Arc::new(MockEmbedder::new(DIM));
    let cache = cache_with(mock.clone(), CacheConfig::default().with_capacity(2));

    cache.embed("a").await.expect("embed");
    cache.embed("b").await.expect("embed");
    cache.embed("a").await.expect("embed");
    cache.embed("c").await.expect("embed");

    assert!(cache.get("a").is_some());
    assert!(cache.get("b").is_none());
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn test_cache_config_validate() {
    assert!(CacheConfig::default().validate().is_ok());
    assert!(CacheConfig::default().with_capacity(0).validate().is_err());
    assert!(CacheConfig::default().with_ttl(Duration::ZERO).validate().is_err());
}
