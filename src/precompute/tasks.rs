//! Job driver and the sub-tasks it fans out.
//!
//! Each sub-task fills its own result slots and reports failure as a string;
//! the driver records failures (and panics) as per-field errors. Only the
//! embeddings sub-task is critical.

use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::config::PrecomputeConfig;
use super::job::{JobStatus, PrecomputeJob, ResultField};
use crate::assistant::{AssistantProvider, bridge_prompt, parse_guesses};
use crate::cache::EmbeddingCache;
use crate::constants::{MIN_NULL_POOL_DRAW, Vector};
use crate::provider::call_with_timeout;
use crate::scoring::lexical_union;
use crate::stats::{NullDistributionTable, StatisticsCache, bootstrap_fixed_prompt};
use crate::vocabulary::VocabularyPool;

/// Shared dependencies handed to every job driver.
pub(crate) struct TaskContext {
    pub(crate) config: PrecomputeConfig,
    pub(crate) embeddings: Arc<EmbeddingCache>,
    pub(crate) pool: Arc<VocabularyPool>,
    pub(crate) stats: Arc<StatisticsCache>,
    pub(crate) assistant: Option<Arc<dyn AssistantProvider>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubTask {
    Embeddings,
    Assistant,
    Lexical,
    NullSamples,
}

impl SubTask {
    fn fields(self) -> &'static [ResultField] {
        match self {
            SubTask::Embeddings => &[ResultField::AnchorVector, ResultField::TargetVector],
            SubTask::Assistant => &[
                ResultField::AssistantSuggestion,
                ResultField::AssistantVectors,
            ],
            SubTask::Lexical => &[ResultField::LexicalBaseline, ResultField::LexicalVectors],
            SubTask::NullSamples => &[ResultField::NullSamples],
        }
    }

    fn name(self) -> &'static str {
        match self {
            SubTask::Embeddings => "embeddings",
            SubTask::Assistant => "assistant",
            SubTask::Lexical => "lexical",
            SubTask::NullSamples => "null_samples",
        }
    }
}

type PromptVectors = Option<(Vector, Vector)>;
type SubTaskResult = Result<(), String>;

/// Runs every sub-task for `job` to completion and sets the terminal status.
pub(crate) async fn run_job(ctx: Arc<TaskContext>, job: Arc<PrecomputeJob>) {
    let started = Instant::now();
    let (prompt_tx, prompt_rx) = watch::channel::<PromptVectors>(None);

    let mut spawned: Vec<(SubTask, JoinHandle<SubTaskResult>)> = Vec::with_capacity(4);
    spawned.push((
        SubTask::Embeddings,
        tokio::spawn(embed_prompt(ctx.clone(), job.clone(), prompt_tx)),
    ));
    if job.params().assistant {
        spawned.push((
            SubTask::Assistant,
            tokio::spawn(assistant_suggestions(ctx.clone(), job.clone())),
        ));
    }
    spawned.push((
        SubTask::Lexical,
        tokio::spawn(lexical_baseline(ctx.clone(), job.clone(), prompt_rx.clone())),
    ));
    spawned.push((
        SubTask::NullSamples,
        tokio::spawn(null_samples(ctx, job.clone(), prompt_rx)),
    ));

    let (kinds, handles): (Vec<_>, Vec<_>) = spawned.into_iter().unzip();
    let outcomes = join_all(handles).await;

    let mut critical_error = None;
    for (kind, outcome) in kinds.into_iter().zip(outcomes) {
        let reason = match outcome {
            Ok(Ok(())) => continue,
            Ok(Err(reason)) => reason,
            Err(join_error) => format!("{} sub-task panicked: {}", kind.name(), join_error),
        };
        warn!(
            entity_id = job.entity_id(),
            sub_task = kind.name(),
            error = %reason,
            "Precompute sub-task failed"
        );
        job.results().record_error(kind.fields(), &reason);
        if kind == SubTask::Embeddings {
            critical_error = Some(reason);
        }
    }

    if job.results().has_prompt_vectors() {
        job.finish(JobStatus::Completed, None);
    } else {
        let reason = critical_error.unwrap_or_else(|| "prompt vectors missing".to_string());
        job.finish(JobStatus::Failed, Some(reason));
    }

    info!(
        entity_id = job.entity_id(),
        status = %job.status(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Precompute finished"
    );
}

/// Critical: anchor and target vectors, published to the other sub-tasks.
async fn embed_prompt(
    ctx: Arc<TaskContext>,
    job: Arc<PrecomputeJob>,
    prompt_tx: watch::Sender<PromptVectors>,
) -> SubTaskResult {
    let params = job.params();
    let vectors = ctx
        .embeddings
        .embed_batch(&[params.anchor.as_str(), params.target.as_str()])
        .await
        .map_err(|e| e.to_string())?;

    let [anchor, target]: [Vector; 2] = vectors
        .try_into()
        .map_err(|v: Vec<Vector>| format!("expected 2 prompt vectors, got {}", v.len()))?;

    job.results().set_prompt_vectors(anchor.clone(), target.clone());
    prompt_tx.send_replace(Some((anchor, target)));
    Ok(())
}

async fn assistant_suggestions(ctx: Arc<TaskContext>, job: Arc<PrecomputeJob>) -> SubTaskResult {
    let Some(assistant) = ctx.assistant.clone() else {
        return Err("no assistant provider configured".to_string());
    };
    let params = job.params();
    let count = params.suggestion_count;

    let prompt = bridge_prompt(&params.anchor, &params.target, count);
    let reply = call_with_timeout(
        assistant.name(),
        ctx.config.assistant_timeout,
        assistant.guess(&prompt),
    )
    .await
    .map_err(|e| e.to_string())?;

    let words = parse_guesses(&reply, count);
    debug!(entity_id = job.entity_id(), suggestions = words.len(), "Assistant replied");
    job.results().set_assistant_suggestion(words.clone());

    let vectors = ctx
        .embeddings
        .embed_batch(&words)
        .await
        .map_err(|e| e.to_string())?;
    job.results().set_assistant_vectors(vectors);
    Ok(())
}

async fn lexical_baseline(
    ctx: Arc<TaskContext>,
    job: Arc<PrecomputeJob>,
    prompt_rx: watch::Receiver<PromptVectors>,
) -> SubTaskResult {
    let snapshot = ctx.pool.snapshot().map_err(|e| e.to_string())?;
    let (anchor_vector, target_vector) = wait_for_prompt(prompt_rx).await?;

    let params = job.params().clone();
    let k = ctx.config.lexical_top_k;
    let candidates = tokio::task::spawn_blocking(move || {
        lexical_union(
            &snapshot,
            &params.anchor,
            &params.target,
            &anchor_vector,
            &target_vector,
            k,
        )
    })
    .await
    .map_err(|e| format!("lexical search failed: {e}"))?;

    let (words, vectors): (Vec<String>, Vec<Vector>) = candidates
        .into_iter()
        .map(|c| (c.word, c.vector))
        .unzip();
    job.results().set_lexical(words, vectors);
    Ok(())
}

async fn null_samples(
    ctx: Arc<TaskContext>,
    job: Arc<PrecomputeJob>,
    prompt_rx: watch::Receiver<PromptVectors>,
) -> SubTaskResult {
    let params = job.params().clone();
    let scorer = ctx
        .stats
        .scorer(&params.context)
        .ok_or_else(|| format!("unknown scoring context: {}", params.context))?;

    let snapshot = ctx.pool.snapshot().map_err(|e| e.to_string())?;
    let draw = ctx.config.null_pool_draw.min(snapshot.vector_count());
    let minimum = MIN_NULL_POOL_DRAW.min(ctx.config.null_pool_draw);
    if draw < minimum {
        return Err(format!(
            "only {draw} vector-bearing words available, need {minimum}"
        ));
    }
    let candidates = snapshot
        .sample_vectors(&mut rand::rng(), draw)
        .map_err(|e| e.to_string())?;
    drop(snapshot);

    let (anchor_vector, target_vector) = wait_for_prompt(prompt_rx).await?;

    let draws = ctx.config.null_bootstrap_samples;
    let table = tokio::task::spawn_blocking(move || {
        let prompt: Vec<&[f32]> = [&anchor_vector[..], &target_vector[..]]
            .into_iter()
            .take(scorer.prompt_words())
            .collect();
        bootstrap_fixed_prompt(
            &candidates,
            &prompt,
            scorer.as_ref(),
            params.sample_size,
            draws,
            &mut rand::rng(),
        )
        .map(|scores| {
            NullDistributionTable::from_scores(&params.context, params.sample_size, &scores)
        })
    })
    .await
    .map_err(|e| format!("null sampling failed: {e}"))?
    .map_err(|e| e.to_string())?;

    job.results().set_null_samples(Arc::new(table));
    Ok(())
}

/// Waits until the embeddings sub-task publishes the prompt vectors.
///
/// Fails if that sub-task ends without publishing.
async fn wait_for_prompt(
    mut rx: watch::Receiver<PromptVectors>,
) -> Result<(Vector, Vector), String> {
    let published = rx
        .wait_for(Option::is_some)
        .await
        .map(|value| (*value).clone())
        .map_err(|_| "prompt vectors unavailable".to_string())?;
    published.ok_or_else(|| "prompt vectors unavailable".to_string())
}
