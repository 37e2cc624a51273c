use serde::Serialize;

use super::similarity::{cosine_similarity, mean, mean_pairwise_distance};
use crate::constants::{CONTEXT_RADIATION, CONTEXT_UNION};

/// Relevance and divergence of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SampleScore {
    pub relevance: f64,
    pub divergence: f64,
}

/// Pure function from (prompt vectors, submission vectors) to a score.
///
/// `prompt` always holds exactly [`SampleScorer::prompt_words`] vectors.
pub trait SampleScorer: Send + Sync {
    /// Context key this scorer is registered under.
    fn context(&self) -> &str;

    /// Number of prompt words a draw must supply.
    fn prompt_words(&self) -> usize;

    fn score(&self, prompt: &[&[f32]], sample: &[&[f32]]) -> SampleScore;
}

/// Two prompt words (anchor, target); a submission word is only as relevant
/// as its weaker link.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnionScorer;

impl SampleScorer for UnionScorer {
    fn context(&self) -> &str {
        CONTEXT_UNION
    }

    fn prompt_words(&self) -> usize {
        2
    }

    fn score(&self, prompt: &[&[f32]], sample: &[&[f32]]) -> SampleScore {
        let (Some(anchor), Some(target)) = (prompt.first(), prompt.get(1)) else {
            return SampleScore::default();
        };
        if sample.is_empty() {
            return SampleScore::default();
        }

        SampleScore {
            relevance: mean(sample.iter().map(|s| {
                cosine_similarity(s, anchor).min(cosine_similarity(s, target))
            })),
            divergence: mean_pairwise_distance(sample),
        }
    }
}

/// One prompt word (the seed).
#[derive(Debug, Clone, Copy, Default)]
pub struct RadiationScorer;

impl SampleScorer for RadiationScorer {
    fn context(&self) -> &str {
        CONTEXT_RADIATION
    }

    fn prompt_words(&self) -> usize {
        1
    }

    fn score(&self, prompt: &[&[f32]], sample: &[&[f32]]) -> SampleScore {
        let Some(seed) = prompt.first() else {
            return SampleScore::default();
        };
        if sample.is_empty() {
            return SampleScore::default();
        }

        SampleScore {
            relevance: mean(sample.iter().map(|s| cosine_similarity(s, seed))),
            divergence: mean_pairwise_distance(sample),
        }
    }
}
