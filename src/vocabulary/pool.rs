//! Shared, atomically swapped vocabulary snapshot.
//!
//! Readers clone the current `Arc<VocabularySnapshot>` under a short read lock
//! and then work lock-free; a reload builds a complete new snapshot off to the
//! side and swaps the pointer. A failed reload leaves the previous snapshot in
//! place.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{info, warn};

use super::config::VocabularyConfig;
use super::error::VocabularyError;
use super::snapshot::VocabularySnapshot;
use super::source::VocabularySource;
use crate::constants::Vector;

/// Point-in-time pool summary for monitoring.
#[derive(Debug, Clone, Serialize)]
pub struct PoolStats {
    pub initialized: bool,
    pub word_count: usize,
    pub vector_count: usize,
    pub vectors_loaded: bool,
    pub last_refresh: Option<DateTime<Utc>>,
    pub needs_refresh: bool,
    pub source: Option<String>,
    pub last_error: Option<String>,
}

pub struct VocabularyPool {
    config: VocabularyConfig,
    snapshot: RwLock<Option<Arc<VocabularySnapshot>>>,
    source: RwLock<Option<Arc<dyn VocabularySource>>>,
    load_vectors: AtomicBool,
    load_lock: tokio::sync::Mutex<()>,
    last_error: RwLock<Option<String>>,
}

impl VocabularyPool {
    pub fn new(config: VocabularyConfig) -> Self {
        Self {
            config,
            snapshot: RwLock::new(None),
            source: RwLock::new(None),
            load_vectors: AtomicBool::new(true),
            load_lock: tokio::sync::Mutex::new(()),
            last_error: RwLock::new(None),
        }
    }

    /// Loads the vocabulary from `source` once.
    ///
    /// A second call after a successful load is a no-op. The source is kept
    /// for [`Self::refresh`].
    pub async fn initialize(
        &self,
        source: Arc<dyn VocabularySource>,
        load_vectors: bool,
    ) -> Result<(), VocabularyError> {
        let _guard = self.load_lock.lock().await;

        if self.snapshot.read().is_some() {
            info!("Vocabulary pool already initialized, skipping load");
            return Ok(());
        }

        *self.source.write() = Some(source.clone());
        self.load_vectors.store(load_vectors, Ordering::Release);
        self.load_from(source.as_ref(), load_vectors).await
    }

    /// Reloads from the stored source and swaps the snapshot.
    pub async fn refresh(&self) -> Result<(), VocabularyError> {
        let _guard = self.load_lock.lock().await;

        let source = self
            .source
            .read()
            .clone()
            .ok_or(VocabularyError::NotInitialized)?;
        let load_vectors = self.load_vectors.load(Ordering::Acquire);
        self.load_from(source.as_ref(), load_vectors).await
    }

    async fn load_from(
        &self,
        source: &dyn VocabularySource,
        load_vectors: bool,
    ) -> Result<(), VocabularyError> {
        let started = Instant::now();

        let result = match source.load_all().await {
            Ok(entries) => VocabularySnapshot::build(entries, load_vectors),
            Err(e) => Err(e),
        };

        match result {
            Ok(snapshot) => {
                info!(
                    source = source.name(),
                    words = snapshot.len(),
                    vectors = snapshot.vector_count(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Vocabulary loaded"
                );
                *self.snapshot.write() = Some(Arc::new(snapshot));
                *self.last_error.write() = None;
                Ok(())
            }
            Err(e) => {
                warn!(source = source.name(), error = %e, "Vocabulary load failed, keeping previous snapshot");
                *self.last_error.write() = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Current snapshot, or [`VocabularyError::NotInitialized`].
    pub fn snapshot(&self) -> Result<Arc<VocabularySnapshot>, VocabularyError> {
        self.snapshot
            .read()
            .clone()
            .ok_or(VocabularyError::NotInitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.snapshot.read().is_some()
    }

    /// Word count of the current snapshot (0 before initialization).
    pub fn size(&self) -> usize {
        self.snapshot.read().as_ref().map_or(0, |s| s.len())
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.snapshot.read().as_ref().map(|s| s.loaded_at())
    }

    /// `true` before the first load and once the snapshot is older than the
    /// configured refresh interval.
    pub fn needs_refresh(&self) -> bool {
        match self.snapshot.read().as_ref() {
            Some(snapshot) => snapshot.age() > self.config.refresh_interval,
            None => true,
        }
    }

    pub fn refresh_interval(&self) -> std::time::Duration {
        self.config.refresh_interval
    }

    pub fn get_random(&self) -> Result<String, VocabularyError> {
        let mut words = self.get_random_batch(1)?;
        words.pop().ok_or(VocabularyError::EmptySource)
    }

    /// `n` distinct words, uniformly without replacement.
    pub fn get_random_batch(&self, n: usize) -> Result<Vec<String>, VocabularyError> {
        let snapshot = self.snapshot()?;
        snapshot.sample_words(&mut rand::rng(), n)
    }

    /// `n` distinct vector-bearing words with their vectors.
    pub fn get_random_with_vectors(
        &self,
        n: usize,
    ) -> Result<Vec<(String, Vector)>, VocabularyError> {
        let snapshot = self.snapshot()?;
        snapshot.sample_with_vectors(&mut rand::rng(), n)
    }

    /// Case-insensitive membership; `false` before initialization.
    pub fn contains(&self, word: &str) -> bool {
        self.snapshot
            .read()
            .as_ref()
            .is_some_and(|s| s.contains(word))
    }

    pub fn stats(&self) -> PoolStats {
        let snapshot = self.snapshot.read().clone();
        PoolStats {
            initialized: snapshot.is_some(),
            word_count: snapshot.as_ref().map_or(0, |s| s.len()),
            vector_count: snapshot.as_ref().map_or(0, |s| s.vector_count()),
            vectors_loaded: snapshot.as_ref().is_some_and(|s| s.vector_count() > 0),
            last_refresh: snapshot.as_ref().map(|s| s.loaded_at()),
            needs_refresh: self.needs_refresh(),
            source: self.source.read().as_ref().map(|s| s.name().to_string()),
            last_error: self.last_error.read().clone(),
        }
    }
}

impl Default for VocabularyPool {
    fn default() -> Self {
        Self::new(VocabularyConfig::default())
    }
}

impl std::fmt::Debug for VocabularyPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VocabularyPool")
            .field("initialized", &self.is_initialized())
            .field("size", &self.size())
            .field("refresh_interval", &self.config.refresh_interval)
            .finish()
    }
}
