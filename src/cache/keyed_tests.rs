use std::time::Duration;

use super::keyed::KeyedCache;

const HOUR: Duration = Duration::from_secs(3600);

#[test]
fn test_keyed_cache_new_is_empty() {
    let cache: KeyedCache<String, u32> = KeyedCache::new(10, HOUR);
    assert!(cache.is_empty());
    assert_eq!(cache.capacity(), 10);
    assert_eq!(cache.ttl(), HOUR);
}

#[tokio::test]
async fn test_keyed_cache_zero_capacity_is_clamped() {
    let cache: KeyedCache<&str, u32> = KeyedCache::new(0, HOUR);
    cache.insert("a", 1);
    assert_eq!(cache.capacity(), 1);
    assert_eq!(cache.get("a"), Some(1));
}

#[tokio::test]
async fn test_keyed_cache_insert_and_get() {
    let cache = KeyedCache::new(10, HOUR);
    cache.insert("ocean".to_string(), 1u32);

    assert_eq!(cache.get("ocean"), Some(1));
    assert_eq!(cache.get("forest"), None);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_keyed_cache_lru_eviction_respects_recent_get() {
    let cache = KeyedCache::new(2, HOUR);
    cache.insert("a", 1);
    cache.insert("b", 2);
    assert_eq!(cache.get("a"), Some(1));
    cache.insert("c", 3);

    assert_eq!(cache.get("b"), None);
    assert_eq!(cache.get("a"), Some(1));
    assert_eq!(cache.get("c"), Some(3));
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.stats().evictions, 1);
}

#[tokio::test]
async fn test_keyed_cache_lru_eviction_without_access() {
    let cache = KeyedCache::new(2, HOUR);
    cache.insert("a", 1);
    cache.insert("b", 2);
    cache.insert("c", 3);

    assert!(!cache.contains("a"));
    assert!(cache.contains("b"));
    assert!(cache.contains("c"));
}

#[tokio::test]
async fn test_keyed_cache_reinsert_replaces_and_refreshes() {
    let cache = KeyedCache::new(2, HOUR);
    cache.insert("a", 1);
    cache.insert("b", 2);
    cache.insert("a", 10);
    cache.insert("c", 3);

    assert_eq!(cache.get("a"), Some(10));
    assert_eq!(cache.get("b"), None);
    assert_eq!(cache.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_keyed_cache_ttl_boundary() {
    let ttl = Duration::from_secs(60);
    let cache = KeyedCache::new(10, ttl);
    cache.insert("a", 1);

    tokio::time::advance(ttl - Duration::from_millis(1)).await;
    assert_eq!(cache.get("a"), Some(1));

    tokio::time::advance(Duration::from_millis(2)).await;
    assert_eq!(cache.get("a"), None);
    assert!(cache.is_empty());

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.expirations, 1);
}

#[tokio::test(start_paused = true)]
async fn test_keyed_cache_hit_does_not_extend_ttl() {
    let ttl = Duration::from_secs(10);
    let cache = KeyedCache::new(10, ttl);
    cache.insert("a", 1);

    tokio::time::advance(Duration::from_secs(9)).await;
    assert_eq!(cache.get("a"), Some(1));

    tokio::time::advance(Duration::from_secs(2)).await;
    assert_eq!(cache.get("a"), None);
}

#[tokio::test(start_paused = true)]
async fn test_keyed_cache_purge_expired() {
    let cache = KeyedCache::new(10, Duration::from_secs(10));
    cache.insert("a", 1);
    tokio::time::advance(Duration::from_secs(5)).await;
    cache.insert("b", 2);
    tokio::time::advance(Duration::from_secs(6)).await;

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.purge_expired(), 1);
    assert_eq!(cache.len(), 1);
    assert!(cache.contains("b"));
}

#[tokio::test(start_paused = true)]
async fn test_keyed_cache_entry_metadata() {
    let ttl = Duration::from_secs(30);
    let cache = KeyedCache::new(10, ttl);
    cache.insert("a", 1);

    tokio::time::advance(Duration::from_secs(5)).await;
    cache.get("a");

    let entry = cache.peek_entry("a").expect("entry present");
    assert_eq!(*entry.value(), 1);
    assert_eq!(entry.expires_at(), entry.inserted_at() + ttl);
    assert!(!entry.is_expired(tokio::time::Instant::now()));
    assert_eq!(cache.stats().hits, 1);
}

#[tokio::test]
async fn test_keyed_cache_lru_victim_follows_reads_not_inserts() {
    let cache = KeyedCache::new(3, HOUR);
    cache.insert("a", 1);
    cache.insert("b", 2);
    cache.insert("c", 3);
    cache.get("a");
    cache.get("b");
    cache.insert("d", 4);

    assert!(!cache.contains("c"));
    assert!(cache.contains("a"));
    assert!(cache.contains("b"));
    assert!(cache.contains("d"));
    assert_eq!(cache.stats().evictions, 1);
}

#[tokio::test]
async fn test_keyed_cache_get_batch_returns_hits_only() {
    let cache = KeyedCache::new(10, HOUR);
    cache.insert("a".to_string(), 1);
    cache.insert("b".to_string(), 2);

    let keys = vec!["a".to_string(), "x".to_string(), "b".to_string(), "a".to_string()];
    let found = cache.get_batch(&keys);

    assert_eq!(found.len(), 2);
    assert_eq!(found.get("a"), Some(&1));
    assert_eq!(found.get("b"), Some(&2));
    assert!(!found.contains_key("x"));
}

#[tokio::test]
async fn test_keyed_cache_get_or_compute_caches_success() {
    let cache = KeyedCache::new(10, HOUR);
    let mut calls = 0;

    let first: Result<u32, String> = cache
        .get_or_compute("a", || {
            calls += 1;
            async { Ok(7) }
        })
        .await;
    assert_eq!(first, Ok(7));

    let second: Result<u32, String> = cache
        .get_or_compute("a", || async { Err("should not run".to_string()) })
        .await;
    assert_eq!(second, Ok(7));
    assert_eq!(calls, 1);
}

#[tokio::test]
async fn test_keyed_cache_get_or_compute_does_not_cache_errors() {
    let cache: KeyedCache<&str, u32> = KeyedCache::new(10, HOUR);

    let result: Result<u32, String> = cache
        .get_or_compute("a", || async { Err("boom".to_string()) })
        .await;
    assert_eq!(result, Err("boom".to_string()));
    assert!(!cache.contains("a"));
}

#[tokio::test]
async fn test_keyed_cache_remove_and_clear() {
    let cache = KeyedCache::new(10, HOUR);
    cache.insert("a", 1);
    cache.insert("b", 2);

    assert_eq!(cache.remove("a"), Some(1));
    assert_eq!(cache.remove("a"), None);

    cache.get("b");
    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.stats().hits, 0);
}

#[tokio::test]
async fn test_keyed_cache_stats_hit_rate() {
    let cache = KeyedCache::new(10, HOUR);
    cache.insert("a", 1);
    cache.get("a");
    cache.get("a");
    cache.get("a");
    cache.get("missing");

    let stats = cache.stats();
    assert_eq!(stats.hits, 3);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.size, 1);
    assert_eq!(stats.capacity, 10);
    assert!((stats.hit_rate - 0.75).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_keyed_cache_concurrent_inserts_stay_within_capacity() {
    let cache = std::sync::Arc::new(KeyedCache::new(50, HOUR));
    let mut handles = Vec::new();

    for worker in 0..8 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..100 {
                cache.insert(format!("{worker}-{i}"), i);
                cache.get(format!("{worker}-{}", i / 2).as_str());
            }
        }));
    }
    for handle in handles {
        handle.await.expect("worker panicked");
    }

    assert_eq!(cache.len(), 50);
}
