//! Monte Carlo draws of random submissions.

use rand::Rng;
use rand::seq::index;

use crate::constants::Vector;
use crate::scoring::{SampleScore, SampleScorer};
use crate::vocabulary::{VocabularyError, VocabularySnapshot};

/// Scores `draws` random submissions against random prompt words.
///
/// Each draw takes `prompt_words + sample_size` distinct vector-bearing words
/// from the snapshot: the leading ones play the prompt, the rest the
/// submission.
pub fn bootstrap_random_prompt<R: Rng + ?Sized>(
    snapshot: &VocabularySnapshot,
    scorer: &dyn SampleScorer,
    sample_size: usize,
    draws: usize,
    rng: &mut R,
) -> Result<Vec<SampleScore>, VocabularyError> {
    let prompt_words = scorer.prompt_words();
    let per_draw = prompt_words + sample_size;
    let mut scores = Vec::with_capacity(draws);

    for _ in 0..draws {
        let vectors = snapshot.sample_vectors(rng, per_draw)?;
        let refs: Vec<&[f32]> = vectors.iter().map(|v| &v[..]).collect();
        let (prompt, sample) = refs.split_at(prompt_words);
        scores.push(scorer.score(prompt, sample));
    }

    Ok(scores)
}

/// Scores `draws` random submissions from `candidates` against fixed prompt
/// vectors (the actual anchor/target or seed of a task).
pub fn bootstrap_fixed_prompt<R: Rng + ?Sized>(
    candidates: &[Vector],
    prompt: &[&[f32]],
    scorer: &dyn SampleScorer,
    sample_size: usize,
    draws: usize,
    rng: &mut R,
) -> Result<Vec<SampleScore>, VocabularyError> {
    if sample_size > candidates.len() {
        return Err(VocabularyError::InsufficientVocabulary {
            requested: sample_size,
            available: candidates.len(),
        });
    }

    let mut scores = Vec::with_capacity(draws);
    for _ in 0..draws {
        let sample: Vec<&[f32]> = index::sample(rng, candidates.len(), sample_size)
            .into_iter()
            .map(|i| &candidates[i][..])
            .collect();
        scores.push(scorer.score(prompt, &sample));
    }

    Ok(scores)
}
