//! Capacity- and TTL-bounded LRU cache.
//!
//! Storage and LRU victim selection are delegated to a `moka` cache built with
//! [`EvictionPolicy::lru`]. Pending maintenance runs after every insert so the
//! capacity bound holds as soon as `insert` returns. Expiry is checked against
//! the tokio clock on read; moka's own TTL only reclaims entries nobody reads.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::notification::RemovalCause;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use tokio::time::Instant;

use super::types::{CacheEntry, CacheStats};

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

impl Counters {
    fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
        self.expirations.store(0, Ordering::Relaxed);
    }
}

/// Generic keyed cache with LRU eviction and a per-entry TTL.
///
/// The TTL counts from insertion; a hit refreshes recency but not expiry.
pub struct KeyedCache<K, V> {
    entries: Cache<K, CacheEntry<V>>,
    capacity: usize,
    ttl: Duration,
    counters: Arc<Counters>,
}

impl<K, V> KeyedCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a cache holding at most `capacity` entries (minimum 1), each
    /// valid for `ttl` after insertion.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = capacity.max(1);
        let counters = Arc::new(Counters::default());
        let listener = Arc::clone(&counters);

        let entries = Cache::builder()
            .max_capacity(capacity as u64)
            .eviction_policy(EvictionPolicy::lru())
            .time_to_live(ttl)
            .eviction_listener(move |_key, _entry, cause| match cause {
                RemovalCause::Size => {
                    listener.evictions.fetch_add(1, Ordering::Relaxed);
                }
                RemovalCause::Expired => {
                    listener.expirations.fetch_add(1, Ordering::Relaxed);
                }
                _ => {}
            })
            .build();

        Self {
            entries,
            capacity,
            ttl,
            counters,
        }
    }

    /// Returns the value for `key` if present and unexpired, refreshing its recency.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.live_entry(key, Instant::now()) {
            Some(entry) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.into_value())
            }
            None => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Returns the cached value or computes, stores and returns it.
    ///
    /// No lock is held while `compute` runs, so two concurrent misses on the
    /// same key may both compute; the later insert wins. Errors are returned
    /// as-is and nothing is cached.
    pub async fn get_or_compute<F, Fut, E>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        let value = compute().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Returns the subset of `keys` that are present and unexpired.
    ///
    /// Misses are simply absent from the map; computing and inserting them is
    /// the caller's job.
    pub fn get_batch(&self, keys: &[K]) -> HashMap<K, V> {
        let mut found = HashMap::with_capacity(keys.len());
        for key in keys {
            if found.contains_key(key) {
                continue;
            }
            if let Some(value) = self.get(key) {
                found.insert(key.clone(), value);
            }
        }
        found
    }

    /// Inserts or replaces `key`, evicting LRU entries past capacity.
    pub fn insert(&self, key: K, value: V) {
        let entry = CacheEntry::new(value, Instant::now(), self.ttl);
        self.entries.insert(key, entry);
        self.entries.run_pending_tasks();
    }

    /// Removes `key`, returning its value if it was present (expired or not).
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(key).map(CacheEntry::into_value)
    }

    /// Returns a copy of the entry without touching the counters.
    pub fn peek_entry<Q>(&self, key: &Q) -> Option<CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    /// Returns `true` if `key` is present and unexpired. Refreshes recency but
    /// is not counted as a hit or miss.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.live_entry(key, Instant::now()).is_some()
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<Arc<K>> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key)
            .collect();

        for key in &expired {
            self.entries.invalidate(key.as_ref());
        }
        self.entries.run_pending_tasks();

        self.counters
            .expirations
            .fetch_add(expired.len() as u64, Ordering::Relaxed);
        expired.len()
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        self.entries.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Clears all entries and resets the counters.
    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
        self.counters.reset();
    }

    pub fn stats(&self) -> CacheStats {
        let size = self.len();
        let hits = self.counters.hits.load(Ordering::Relaxed);
        let misses = self.counters.misses.load(Ordering::Relaxed);
        let total = hits + misses;

        CacheStats {
            hits,
            misses,
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            expirations: self.counters.expirations.load(Ordering::Relaxed),
            size,
            capacity: self.capacity,
            hit_rate: if total > 0 {
                hits as f64 / total as f64
            } else {
                0.0
            },
        }
    }

    /// The entry for `key` if it has not expired. An expired entry is dropped
    /// and counted.
    fn live_entry<Q>(&self, key: &Q, now: Instant) -> Option<CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.entries.get(key)?;
        if entry.is_expired(now) {
            self.entries.invalidate(key);
            self.counters.expirations.fetch_add(1, Ordering::Relaxed);
            return None;
        }
        Some(entry)
    }
}

impl<K, V> std::fmt::Debug for KeyedCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedCache")
            .field("entries", &self.entries.entry_count())
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .finish()
    }
}
