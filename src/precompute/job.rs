use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;
use tokio::time::Instant;

use super::params::PrecomputeParams;
use crate::constants::Vector;
use crate::stats::{Metric, NullDistributionTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl JobStatus {
    /// `Pending` or `InProgress`.
    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::InProgress)
    }

    /// `Completed` or `Failed`.
    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names of the result-bag fields, used to key per-field errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultField {
    AnchorVector,
    TargetVector,
    AssistantSuggestion,
    AssistantVectors,
    LexicalBaseline,
    LexicalVectors,
    NullSamples,
}

/// Write-once result slots of a job.
///
/// Each slot is filled by exactly one sub-task; readers see either nothing or
/// the final value.
#[derive(Debug, Default)]
pub struct ResultBag {
    anchor_vector: OnceLock<Vector>,
    target_vector: OnceLock<Vector>,
    assistant_suggestion: OnceLock<Vec<String>>,
    assistant_vectors: OnceLock<Vec<Vector>>,
    lexical_baseline: OnceLock<Vec<String>>,
    lexical_vectors: OnceLock<Vec<Vector>>,
    null_samples: OnceLock<Arc<NullDistributionTable>>,
    field_errors: Mutex<BTreeMap<ResultField, String>>,
}

impl ResultBag {
    pub(crate) fn set_prompt_vectors(&self, anchor: Vector, target: Vector) {
        let _ = self.anchor_vector.set(anchor);
        let _ = self.target_vector.set(target);
    }

    pub(crate) fn set_assistant_suggestion(&self, words: Vec<String>) {
        let _ = self.assistant_suggestion.set(words);
    }

    pub(crate) fn set_assistant_vectors(&self, vectors: Vec<Vector>) {
        let _ = self.assistant_vectors.set(vectors);
    }

    pub(crate) fn set_lexical(&self, words: Vec<String>, vectors: Vec<Vector>) {
        let _ = self.lexical_baseline.set(words);
        let _ = self.lexical_vectors.set(vectors);
    }

    pub(crate) fn set_null_samples(&self, table: Arc<NullDistributionTable>) {
        let _ = self.null_samples.set(table);
    }

    /// Records `reason` against every field in `fields` that is still empty.
    pub(crate) fn record_error(&self, fields: &[ResultField], reason: &str) {
        let mut errors = self.field_errors.lock();
        for &field in fields {
            if !self.is_set(field) {
                errors.entry(field).or_insert_with(|| reason.to_string());
            }
        }
    }

    pub fn is_set(&self, field: ResultField) -> bool {
        match field {
            ResultField::AnchorVector => self.anchor_vector.get().is_some(),
            ResultField::TargetVector => self.target_vector.get().is_some(),
            ResultField::AssistantSuggestion => self.assistant_suggestion.get().is_some(),
            ResultField::AssistantVectors => self.assistant_vectors.get().is_some(),
            ResultField::LexicalBaseline => self.lexical_baseline.get().is_some(),
            ResultField::LexicalVectors => self.lexical_vectors.get().is_some(),
            ResultField::NullSamples => self.null_samples.get().is_some(),
        }
    }

    /// Both prompt vectors are present.
    pub fn has_prompt_vectors(&self) -> bool {
        self.anchor_vector.get().is_some() && self.target_vector.get().is_some()
    }

    pub fn field_error(&self, field: ResultField) -> Option<String> {
        self.field_errors.lock().get(&field).cloned()
    }

    pub fn field_errors(&self) -> BTreeMap<ResultField, String> {
        self.field_errors.lock().clone()
    }
}

#[derive(Debug, Default)]
struct JobOutcome {
    completed_at: Option<DateTime<Utc>>,
    finished: Option<Instant>,
    error: Option<String>,
}

/// One precompute run for one entity.
///
/// Status changes are published on a `watch` channel so `get_result` can wait
/// for completion without polling.
#[derive(Debug)]
pub struct PrecomputeJob {
    entity_id: String,
    params: PrecomputeParams,
    started_at: DateTime<Utc>,
    started: Instant,
    status: watch::Sender<JobStatus>,
    outcome: Mutex<JobOutcome>,
    results: ResultBag,
}

impl PrecomputeJob {
    pub(crate) fn new(entity_id: impl Into<String>, params: PrecomputeParams) -> Self {
        let (status, _) = watch::channel(JobStatus::Pending);
        Self {
            entity_id: entity_id.into(),
            params,
            started_at: Utc::now(),
            started: Instant::now(),
            status,
            outcome: Mutex::new(JobOutcome::default()),
            results: ResultBag::default(),
        }
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn params(&self) -> &PrecomputeParams {
        &self.params
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub(crate) fn started(&self) -> Instant {
        self.started
    }

    pub fn status(&self) -> JobStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<JobStatus> {
        self.status.subscribe()
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.outcome.lock().completed_at
    }

    pub(crate) fn finished(&self) -> Option<Instant> {
        self.outcome.lock().finished
    }

    pub fn error(&self) -> Option<String> {
        self.outcome.lock().error.clone()
    }

    pub fn results(&self) -> &ResultBag {
        &self.results
    }

    pub(crate) fn set_status(&self, status: JobStatus) {
        self.status.send_replace(status);
    }

    /// Moves the job to a terminal status. The outcome is written before the
    /// status is published, so a woken waiter sees `completed_at`.
    pub(crate) fn finish(&self, status: JobStatus, error: Option<String>) {
        {
            let mut outcome = self.outcome.lock();
            outcome.completed_at = Some(Utc::now());
            outcome.finished = Some(Instant::now());
            outcome.error = error;
        }
        self.set_status(status);
    }

    /// Copies whatever is available right now.
    pub fn snapshot(&self) -> PartialResult {
        let outcome = self.outcome.lock();
        let r = &self.results;
        PartialResult {
            entity_id: self.entity_id.clone(),
            status: Some(self.status()),
            started_at: Some(self.started_at),
            completed_at: outcome.completed_at,
            error: outcome.error.clone(),
            anchor_vector: r.anchor_vector.get().cloned(),
            target_vector: r.target_vector.get().cloned(),
            assistant_suggestion: r.assistant_suggestion.get().cloned(),
            assistant_vectors: r.assistant_vectors.get().cloned(),
            lexical_baseline: r.lexical_baseline.get().cloned(),
            lexical_vectors: r.lexical_vectors.get().cloned(),
            null_samples: r.null_samples.get().cloned(),
            field_errors: r.field_errors(),
        }
    }
}

/// Point-in-time copy of a job's result bag.
///
/// Any field may be `None`; callers compute missing pieces themselves.
#[derive(Debug, Clone, Default)]
pub struct PartialResult {
    pub entity_id: String,
    /// `None` when no job exists for the entity.
    pub status: Option<JobStatus>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub anchor_vector: Option<Vector>,
    pub target_vector: Option<Vector>,
    pub assistant_suggestion: Option<Vec<String>>,
    pub assistant_vectors: Option<Vec<Vector>>,
    pub lexical_baseline: Option<Vec<String>>,
    pub lexical_vectors: Option<Vec<Vector>>,
    pub null_samples: Option<Arc<NullDistributionTable>>,
    pub field_errors: BTreeMap<ResultField, String>,
}

impl PartialResult {
    /// Result for an entity with no job.
    pub fn not_ready(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            ..Default::default()
        }
    }

    pub fn is_found(&self) -> bool {
        self.status.is_some()
    }

    /// The job reached a terminal status.
    pub fn is_ready(&self) -> bool {
        self.status.is_some_and(JobStatus::is_terminal)
    }

    pub fn has_prompt_vectors(&self) -> bool {
        self.anchor_vector.is_some() && self.target_vector.is_some()
    }

    /// Relevance percentile against this job's own null samples.
    pub fn null_percentile(&self, observed: f64) -> Option<f64> {
        self.null_samples
            .as_ref()
            .map(|t| t.percentile(Metric::Relevance, observed))
    }
}
