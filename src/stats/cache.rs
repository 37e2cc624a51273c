//! Precomputed null distributions, keyed by scoring context and sample size.
//!
//! Tables are built on the blocking pool from the current vocabulary snapshot
//! and published as one immutable map; a refresh builds a new map and swaps it
//! in, so a lookup never sees a half-built set.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::bootstrap::bootstrap_random_prompt;
use super::config::StatsConfig;
use super::error::StatsError;
use super::table::{Metric, NullDistributionTable};
use crate::scoring::{RadiationScorer, SampleScorer, UnionScorer};
use crate::vocabulary::{VocabularyError, VocabularyPool, VocabularySnapshot};

type TableKey = (String, usize);

struct TableSet {
    tables: HashMap<TableKey, Arc<NullDistributionTable>>,
    built_at: tokio::time::Instant,
    built_at_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableStats {
    pub context: String,
    pub sample_size: usize,
    pub samples: usize,
    pub relevance_mean: f64,
    pub divergence_mean: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsCacheStats {
    pub initialized: bool,
    pub contexts: Vec<String>,
    pub tables: Vec<TableStats>,
    pub samples_per_table: usize,
    pub last_refresh: Option<DateTime<Utc>>,
    pub needs_refresh: bool,
}

pub struct StatisticsCache {
    config: StatsConfig,
    scorers: Vec<Arc<dyn SampleScorer>>,
    tables: RwLock<Option<Arc<TableSet>>>,
    build_lock: tokio::sync::Mutex<()>,
}

impl StatisticsCache {
    /// Cache with the union and radiation scorers registered.
    pub fn new(config: StatsConfig) -> Self {
        Self::with_scorers(
            config,
            vec![Arc::new(UnionScorer), Arc::new(RadiationScorer)],
        )
    }

    pub fn with_scorers(config: StatsConfig, scorers: Vec<Arc<dyn SampleScorer>>) -> Self {
        Self {
            config,
            scorers,
            tables: RwLock::new(None),
            build_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// Scorer registered under `context`.
    pub fn scorer(&self, context: &str) -> Option<Arc<dyn SampleScorer>> {
        self.scorers
            .iter()
            .find(|s| s.context() == context)
            .cloned()
    }

    pub fn contexts(&self) -> Vec<String> {
        self.scorers.iter().map(|s| s.context().to_string()).collect()
    }

    /// Builds every table once; later calls are no-ops.
    pub async fn initialize(&self, pool: &VocabularyPool) -> Result<(), StatsError> {
        let _guard = self.build_lock.lock().await;
        if self.tables.read().is_some() {
            debug!("Statistics cache already initialized");
            return Ok(());
        }
        self.rebuild(pool).await
    }

    /// Rebuilds every table from the current snapshot and swaps them in.
    ///
    /// On failure the previous tables stay published.
    pub async fn refresh(&self, pool: &VocabularyPool) -> Result<(), StatsError> {
        let _guard = self.build_lock.lock().await;
        self.rebuild(pool).await
    }

    async fn rebuild(&self, pool: &VocabularyPool) -> Result<(), StatsError> {
        let snapshot = pool.snapshot()?;
        let scorers = self.scorers.clone();
        let config = self.config.clone();
        let started = Instant::now();

        let tables = tokio::task::spawn_blocking(move || build_tables(&snapshot, &scorers, &config))
            .await
            .map_err(|e| StatsError::Join(e.to_string()))??;

        info!(
            tables = tables.len(),
            samples = self.config.bootstrap_samples,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Null distributions built"
        );

        *self.tables.write() = Some(Arc::new(TableSet {
            tables,
            built_at: tokio::time::Instant::now(),
            built_at_utc: Utc::now(),
        }));
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.tables.read().is_some()
    }

    pub fn needs_refresh(&self) -> bool {
        match self.tables.read().as_ref() {
            Some(set) => set.built_at.elapsed() > self.config.refresh_interval,
            None => true,
        }
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.tables.read().as_ref().map(|set| set.built_at_utc)
    }

    /// Table for `(context, sample_size)`, if built.
    pub fn table(&self, context: &str, sample_size: usize) -> Option<Arc<NullDistributionTable>> {
        self.tables
            .read()
            .as_ref()
            .and_then(|set| set.tables.get(&(context.to_string(), sample_size)).cloned())
    }

    /// Relevance percentile of `observed` against the null for this context.
    pub fn get_percentile(
        &self,
        context: &str,
        sample_size: usize,
        observed: f64,
    ) -> Result<f64, StatsError> {
        self.get_percentile_for(Metric::Relevance, context, sample_size, observed)
    }

    pub fn get_percentile_for(
        &self,
        metric: Metric,
        context: &str,
        sample_size: usize,
        observed: f64,
    ) -> Result<f64, StatsError> {
        let table = self.require_table(context, sample_size)?;
        Ok(table.percentile(metric, observed))
    }

    pub fn get_z_score(
        &self,
        metric: Metric,
        context: &str,
        sample_size: usize,
        observed: f64,
    ) -> Result<f64, StatsError> {
        let table = self.require_table(context, sample_size)?;
        Ok(table.z_score(metric, observed))
    }

    /// Builds a one-off table synchronously with `draws` samples.
    ///
    /// For callers that cannot wait for (or did not find) a precomputed
    /// table; the result is not stored.
    pub fn compute_fallback(
        &self,
        pool: &VocabularyPool,
        context: &str,
        sample_size: usize,
        draws: usize,
    ) -> Result<NullDistributionTable, StatsError> {
        let scorer = self
            .scorer(context)
            .ok_or_else(|| StatsError::UnknownContext {
                context: context.to_string(),
            })?;
        let snapshot = pool.snapshot()?;

        let scores = bootstrap_random_prompt(
            &snapshot,
            scorer.as_ref(),
            sample_size,
            draws,
            &mut rand::rng(),
        )?;
        Ok(NullDistributionTable::from_scores(context, sample_size, &scores))
    }

    /// Drops every table.
    pub fn clear(&self) {
        *self.tables.write() = None;
    }

    pub fn stats(&self) -> StatsCacheStats {
        let set = self.tables.read().clone();
        let mut tables: Vec<TableStats> = set
            .as_ref()
            .map(|set| {
                set.tables
                    .values()
                    .map(|t| TableStats {
                        context: t.context().to_string(),
                        sample_size: t.sample_size(),
                        samples: t.len(),
                        relevance_mean: t.summary(Metric::Relevance).mean,
                        divergence_mean: t.summary(Metric::Divergence).mean,
                    })
                    .collect()
            })
            .unwrap_or_default();
        tables.sort_by(|a, b| (&a.context, a.sample_size).cmp(&(&b.context, b.sample_size)));

        StatsCacheStats {
            initialized: set.is_some(),
            contexts: self.contexts(),
            tables,
            samples_per_table: self.config.bootstrap_samples,
            last_refresh: set.as_ref().map(|s| s.built_at_utc),
            needs_refresh: self.needs_refresh(),
        }
    }

    fn require_table(
        &self,
        context: &str,
        sample_size: usize,
    ) -> Result<Arc<NullDistributionTable>, StatsError> {
        if self.scorer(context).is_none() {
            return Err(StatsError::UnknownContext {
                context: context.to_string(),
            });
        }
        self.table(context, sample_size)
            .ok_or_else(|| StatsError::NotReady {
                context: context.to_string(),
                sample_size,
            })
    }
}

/// Builds every `(context, size)` table the snapshot can support.
///
/// Sizes too large for the vector-bearing vocabulary are skipped; an error is
/// returned only when nothing could be built.
fn build_tables(
    snapshot: &VocabularySnapshot,
    scorers: &[Arc<dyn SampleScorer>],
    config: &StatsConfig,
) -> Result<HashMap<TableKey, Arc<NullDistributionTable>>, StatsError> {
    let mut rng = rand::rng();
    let mut tables = HashMap::new();
    let mut first_error: Option<VocabularyError> = None;

    for scorer in scorers {
        for &size in &config.sample_sizes {
            match bootstrap_random_prompt(
                snapshot,
                scorer.as_ref(),
                size,
                config.bootstrap_samples,
                &mut rng,
            ) {
                Ok(scores) => {
                    let table = NullDistributionTable::from_scores(scorer.context(), size, &scores);
                    tables.insert((scorer.context().to_string(), size), Arc::new(table));
                }
                Err(e) => {
                    warn!(context = scorer.context(), sample_size = size, error = %e, "Skipping null distribution");
                    first_error.get_or_insert(e);
                }
            }
        }
    }

    match first_error {
        Some(e) if tables.is_empty() => Err(e.into()),
        _ => Ok(tables),
    }
}

impl std::fmt::Debug for StatisticsCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatisticsCache")
            .field("contexts", &self.contexts())
            .field("initialized", &self.is_initialized())
            .field("config", &self.config)
            .finish()
    }
}
