//! Process-wide service container.
//!
//! Built once at startup and shared as `Arc<InsightServices>`; owns the
//! caches, the vocabulary pool and the orchestrator.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{info, warn};

use crate::assistant::AssistantProvider;
use crate::cache::{
    CacheConfig, CacheStats, EmbeddingCache, NoiseFloor, NoiseFloorCache, NoiseFloorConfig,
    NoiseFloorError,
};
use crate::config::ConfigError;
use crate::embedding::EmbeddingProvider;
use crate::precompute::{OrchestratorStats, PrecomputeConfig, PrecomputeOrchestrator};
use crate::stats::{StatisticsCache, StatsCacheStats, StatsConfig, StatsError};
use crate::vocabulary::{PoolStats, VocabularyConfig, VocabularyPool, VocabularySource};

/// Tuning for every component.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub cache: CacheConfig,
    pub noise_floor: NoiseFloorConfig,
    pub vocabulary: VocabularyConfig,
    pub stats: StatsConfig,
    pub precompute: PrecomputeConfig,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            cache: CacheConfig::from_env()?,
            noise_floor: NoiseFloorConfig::from_env()?,
            vocabulary: VocabularyConfig::from_env()?,
            stats: StatsConfig::from_env()?,
            precompute: PrecomputeConfig::from_env()?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cache.validate()?;
        self.noise_floor.validate()?;
        self.stats.validate()?;
        self.precompute.validate()
    }
}

/// Snapshot of every component, served by `/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub ready: bool,
    pub embedding_provider: String,
    pub embedding_cache: CacheStats,
    pub noise_floor_cache: CacheStats,
    pub vocabulary: PoolStats,
    pub statistics: StatsCacheStats,
    pub jobs: OrchestratorStats,
}

pub struct InsightServices {
    embeddings: Arc<EmbeddingCache>,
    noise_floors: NoiseFloorCache,
    pool: Arc<VocabularyPool>,
    stats: Arc<StatisticsCache>,
    orchestrator: Arc<PrecomputeOrchestrator>,
    maintenance_running: Arc<AtomicBool>,
}

impl InsightServices {
    pub fn new(
        config: ServiceConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        assistant: Option<Arc<dyn AssistantProvider>>,
    ) -> Self {
        let embeddings = Arc::new(EmbeddingCache::new(&config.cache, embedder));
        let noise_floors = NoiseFloorCache::new(&config.noise_floor);
        let pool = Arc::new(VocabularyPool::new(config.vocabulary));
        let stats = Arc::new(StatisticsCache::new(config.stats));
        let orchestrator = Arc::new(PrecomputeOrchestrator::new(
            config.precompute,
            Arc::clone(&embeddings),
            Arc::clone(&pool),
            Arc::clone(&stats),
            assistant,
        ));

        Self {
            embeddings,
            noise_floors,
            pool,
            stats,
            orchestrator,
            maintenance_running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn embeddings(&self) -> &Arc<EmbeddingCache> {
        &self.embeddings
    }

    pub fn noise_floors(&self) -> &NoiseFloorCache {
        &self.noise_floors
    }

    /// The `k` vocabulary words nearest to `seed` read in `context`, cached.
    pub async fn noise_floor<S: AsRef<str>>(
        &self,
        seed: &str,
        context: &[S],
        k: usize,
    ) -> Result<NoiseFloor, NoiseFloorError> {
        self.noise_floors
            .noise_floor(&self.embeddings, &self.pool, seed, context, k)
            .await
    }

    pub fn pool(&self) -> &Arc<VocabularyPool> {
        &self.pool
    }

    pub fn stats(&self) -> &Arc<StatisticsCache> {
        &self.stats
    }

    pub fn orchestrator(&self) -> &Arc<PrecomputeOrchestrator> {
        &self.orchestrator
    }

    /// Loads the vocabulary, then builds the null distributions.
    ///
    /// A vocabulary failure is fatal. A statistics failure is logged and
    /// returned, but the pool stays usable so lookups can fall back to
    /// `compute_fallback`.
    pub async fn warm_up(
        &self,
        source: Arc<dyn VocabularySource>,
        load_vectors: bool,
    ) -> Result<(), StatsError> {
        self.pool.initialize(source, load_vectors).await?;
        info!(words = self.pool.size(), "Vocabulary ready");

        if let Err(e) = self.stats.initialize(&self.pool).await {
            warn!(error = %e, "Null distributions unavailable");
            return Err(e);
        }
        Ok(())
    }

    /// Vocabulary initialized and at least one null table built.
    pub fn is_ready(&self) -> bool {
        self.pool.is_initialized() && self.stats.stats().tables.iter().any(|t| t.samples > 0)
    }

    /// Starts the job sweeper and the refresh loop (no-op if already running).
    ///
    /// The refresh loop wakes at the shorter of the two refresh intervals and
    /// reloads whatever is stale. Failures keep the previous data.
    pub fn start_background_tasks(&self) -> Vec<JoinHandle<()>> {
        let sweeper = self.orchestrator.start_sweeper();

        // AcqRel: only one refresh loop may observe `false` here.
        if self.maintenance_running.swap(true, Ordering::AcqRel) {
            return vec![sweeper];
        }

        let pool = Arc::downgrade(&self.pool);
        let stats = Arc::downgrade(&self.stats);
        let running = Arc::clone(&self.maintenance_running);
        let period = self
            .pool
            .refresh_interval()
            .min(self.stats.config().refresh_interval);

        let refresher = tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                let (Some(pool), Some(stats)) = (pool.upgrade(), stats.upgrade()) else {
                    break;
                };
                refresh_stale(&pool, &stats).await;
            }
            // Release: pairs with the AcqRel swap in a later call.
            running.store(false, Ordering::Release);
        });

        vec![sweeper, refresher]
    }

    pub fn health(&self) -> HealthReport {
        HealthReport {
            ready: self.is_ready(),
            embedding_provider: self.embeddings.provider_name().to_string(),
            embedding_cache: self.embeddings.stats(),
            noise_floor_cache: self.noise_floors.stats(),
            vocabulary: self.pool.stats(),
            statistics: self.stats.stats(),
            jobs: self.orchestrator.stats(),
        }
    }
}

/// One maintenance pass: refresh whatever is stale.
pub async fn refresh_stale(pool: &VocabularyPool, stats: &StatisticsCache) {
    let mut vocabulary_changed = false;
    if pool.is_initialized() && pool.needs_refresh() {
        match pool.refresh().await {
            Ok(()) => {
                vocabulary_changed = true;
                info!(words = pool.size(), "Vocabulary refreshed");
            }
            Err(e) => warn!(error = %e, "Vocabulary refresh failed; keeping previous snapshot"),
        }
    }

    if pool.is_initialized() && (vocabulary_changed || stats.needs_refresh()) {
        if let Err(e) = stats.refresh(pool).await {
            warn!(error = %e, "Statistics refresh failed; keeping previous tables");
        }
    }
}

impl std::fmt::Debug for InsightServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsightServices")
            .field("embeddings", &self.embeddings)
            .field("noise_floors", &self.noise_floors)
            .field("pool", &self.pool)
            .field("stats", &self.stats)
            .field("orchestrator", &self.orchestrator)
            .finish()
    }
}
