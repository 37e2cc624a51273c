//! Entity-keyed precompute jobs.
//!
//! `start_precompute` is idempotent per entity while a job is active and
//! returns immediately; the work runs on spawned tasks. `get_result` waits at
//! most its timeout and always answers with whatever is ready.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info, instrument, warn};

use super::config::{CapacityPolicy, PrecomputeConfig};
use super::error::PrecomputeError;
use super::job::{JobStatus, PartialResult, PrecomputeJob};
use super::params::PrecomputeParams;
use super::tasks::{TaskContext, run_job};
use crate::assistant::AssistantProvider;
use crate::cache::EmbeddingCache;
use crate::stats::StatisticsCache;
use crate::vocabulary::VocabularyPool;

struct JobEntry {
    job: Arc<PrecomputeJob>,
    driver: JoinHandle<()>,
}

type JobMap = Mutex<HashMap<String, JobEntry>>;

/// What `start_precompute` did.
#[derive(Debug, Clone)]
pub struct StartOutcome {
    pub job: Arc<PrecomputeJob>,
    /// `false` when an active job for the entity already existed.
    pub started: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OrchestratorStats {
    pub total_jobs: usize,
    pub active_jobs: usize,
    /// Job drivers that have not returned yet.
    pub running_tasks: usize,
    pub status_counts: BTreeMap<JobStatus, usize>,
    pub max_jobs: usize,
}

pub struct PrecomputeOrchestrator {
    ctx: Arc<TaskContext>,
    jobs: Arc<JobMap>,
    sweeper_running: Arc<AtomicBool>,
}

impl PrecomputeOrchestrator {
    pub fn new(
        config: PrecomputeConfig,
        embeddings: Arc<EmbeddingCache>,
        pool: Arc<VocabularyPool>,
        stats: Arc<StatisticsCache>,
        assistant: Option<Arc<dyn AssistantProvider>>,
    ) -> Self {
        Self {
            ctx: Arc::new(TaskContext {
                config,
                embeddings,
                pool,
                stats,
                assistant,
            }),
            jobs: Arc::new(Mutex::new(HashMap::new())),
            sweeper_running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &PrecomputeConfig {
        &self.ctx.config
    }

    pub fn has_assistant(&self) -> bool {
        self.ctx.assistant.is_some()
    }

    /// Starts precomputation for `entity_id` unless a job is already active.
    ///
    /// Never waits on the work itself. A finished job for the same entity is
    /// replaced by a fresh one. Must be called inside a Tokio runtime.
    #[instrument(skip(self, params))]
    pub fn start_precompute(
        &self,
        entity_id: &str,
        params: PrecomputeParams,
    ) -> Result<StartOutcome, PrecomputeError> {
        if entity_id.trim().is_empty() {
            return Err(PrecomputeError::InvalidParams {
                reason: "entity id must not be blank".to_string(),
            });
        }
        params.validate()?;

        let mut jobs = self.jobs.lock();

        if let Some(entry) = jobs.get(entity_id) {
            if entry.job.status().is_active() {
                debug!(entity_id, "Precompute already running");
                return Ok(StartOutcome {
                    job: Arc::clone(&entry.job),
                    started: false,
                });
            }
        }
        jobs.remove(entity_id);

        sweep_expired(&mut jobs, self.ctx.config.job_ttl);
        make_room(&mut jobs, &self.ctx.config)?;

        let job = Arc::new(PrecomputeJob::new(entity_id, params));
        job.set_status(JobStatus::InProgress);
        let driver = tokio::spawn(run_job(Arc::clone(&self.ctx), Arc::clone(&job)));
        jobs.insert(
            entity_id.to_string(),
            JobEntry {
                job: Arc::clone(&job),
                driver,
            },
        );

        info!(
            entity_id,
            context = %job.params().context,
            assistant = job.params().assistant,
            "Precompute started"
        );
        Ok(StartOutcome { job, started: true })
    }

    /// Whatever is ready for `entity_id`, waiting up to `timeout` for the job
    /// to finish first.
    ///
    /// Never fails: an unknown entity yields [`PartialResult::not_ready`] and a
    /// timeout yields the partial state.
    #[instrument(skip(self))]
    pub async fn get_result(&self, entity_id: &str, timeout: Duration) -> PartialResult {
        let Some(job) = self.job(entity_id) else {
            return PartialResult::not_ready(entity_id);
        };

        if job.status().is_active() && !timeout.is_zero() {
            let mut rx = job.subscribe();
            let finished = time::timeout(timeout, rx.wait_for(|s| s.is_terminal()))
                .await
                .is_ok();
            if !finished {
                debug!(entity_id, ?timeout, "Returning partial precompute result");
            }
        }

        job.snapshot()
    }

    pub fn status(&self, entity_id: &str) -> Option<JobStatus> {
        self.jobs.lock().get(entity_id).map(|e| e.job.status())
    }

    pub fn job(&self, entity_id: &str) -> Option<Arc<PrecomputeJob>> {
        self.jobs.lock().get(entity_id).map(|e| Arc::clone(&e.job))
    }

    /// Forgets the job for `entity_id`. A running driver finishes on its own.
    pub fn remove(&self, entity_id: &str) -> Option<Arc<PrecomputeJob>> {
        self.jobs.lock().remove(entity_id).map(|e| e.job)
    }

    /// Drops finished jobs older than the TTL. Returns how many were dropped.
    pub fn sweep(&self) -> usize {
        sweep_expired(&mut self.jobs.lock(), self.ctx.config.job_ttl)
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }

    pub fn stats(&self) -> OrchestratorStats {
        let jobs = self.jobs.lock();
        let mut stats = OrchestratorStats {
            total_jobs: jobs.len(),
            max_jobs: self.ctx.config.max_jobs,
            ..Default::default()
        };
        for entry in jobs.values() {
            let status = entry.job.status();
            if status.is_active() {
                stats.active_jobs += 1;
            }
            if !entry.driver.is_finished() {
                stats.running_tasks += 1;
            }
            *stats.status_counts.entry(status).or_default() += 1;
        }
        stats
    }

    /// Starts the periodic TTL sweep (no-op if already running).
    ///
    /// The task holds only a weak reference to the job map and stops once the
    /// orchestrator is dropped.
    pub fn start_sweeper(&self) -> JoinHandle<()> {
        // AcqRel: only one sweeper may observe `false` here.
        if self.sweeper_running.swap(true, Ordering::AcqRel) {
            return tokio::spawn(async {});
        }

        let jobs: Weak<JobMap> = Arc::downgrade(&self.jobs);
        let ttl = self.ctx.config.job_ttl;
        let period = self.ctx.config.sweep_interval;
        let sweeper_running = Arc::clone(&self.sweeper_running);

        tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(jobs) = jobs.upgrade() else {
                    break;
                };
                let removed = sweep_expired(&mut jobs.lock(), ttl);
                if removed > 0 {
                    debug!(removed, "Swept expired precompute jobs");
                }
            }
            // Release: pairs with the AcqRel swap in a later start_sweeper().
            sweeper_running.store(false, Ordering::Release);
        })
    }
}

fn sweep_expired(jobs: &mut HashMap<String, JobEntry>, ttl: Duration) -> usize {
    let now = Instant::now();
    let before = jobs.len();
    jobs.retain(|_, entry| match entry.job.finished() {
        Some(finished) => finished + ttl > now,
        None => true,
    });
    before - jobs.len()
}

/// Frees one slot per the capacity policy when the map is full.
fn make_room(
    jobs: &mut HashMap<String, JobEntry>,
    config: &PrecomputeConfig,
) -> Result<(), PrecomputeError> {
    while jobs.len() >= config.max_jobs {
        let victim = match config.capacity_policy {
            CapacityPolicy::EvictOldest => {
                oldest(jobs, |job| job.status().is_terminal()).or_else(|| oldest(jobs, |_| true))
            }
            CapacityPolicy::Reject => oldest(jobs, |job| job.status().is_terminal()),
        };
        let Some(victim) = victim else {
            warn!(limit = config.max_jobs, "Precompute capacity exceeded");
            return Err(PrecomputeError::CapacityExceeded {
                limit: config.max_jobs,
            });
        };
        if let Some(entry) = jobs.remove(&victim) {
            debug!(
                entity_id = %victim,
                status = %entry.job.status(),
                "Evicted precompute job"
            );
        }
    }
    Ok(())
}

fn oldest(
    jobs: &HashMap<String, JobEntry>,
    eligible: impl Fn(&PrecomputeJob) -> bool,
) -> Option<String> {
    jobs.iter()
        .filter(|(_, entry)| eligible(&entry.job))
        .min_by_key(|(_, entry)| entry.job.started())
        .map(|(id, _)| id.clone())
}

impl std::fmt::Debug for PrecomputeOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrecomputeOrchestrator")
            .field("jobs", &self.len())
            .field("config", &self.ctx.config)
            .field("assistant", &self.has_assistant())
            .finish()
    }
}
