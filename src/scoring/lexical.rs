//! Lexical baseline: the vocabulary words closest to both prompt words.

use serde::Serialize;

use super::similarity::cosine_similarity;
use crate::constants::Vector;
use crate::vocabulary::{VocabularySnapshot, normalize_word};

/// Shortest shared prefix that makes two different words variants.
const MIN_STEM: usize = 4;
/// Longest suffix either word may carry past the shared prefix.
const MAX_SUFFIX: usize = 3;

/// A vocabulary word ranked by `min(cos(anchor), cos(target))`.
#[derive(Debug, Clone, Serialize)]
pub struct LexicalCandidate {
    pub word: String,
    pub score: f64,
    #[serde(skip)]
    pub vector: Vector,
}

/// Returns `true` if `a` and `b` are the same word or inflections of one stem.
///
/// Words match when one is a prefix of the other (the shorter at least three
/// letters), or when they share a prefix of at least four letters and neither
/// extends it by more than three.
pub fn is_morphological_variant(a: &str, b: &str) -> bool {
    let a: Vec<char> = normalize_word(a).chars().collect();
    let b: Vec<char> = normalize_word(b).chars().collect();
    if a == b {
        return true;
    }

    let shared = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
    let shorter = a.len().min(b.len());

    if shared == shorter {
        return shorter >= 3;
    }
    shared >= MIN_STEM && a.len() - shared <= MAX_SUFFIX && b.len() - shared <= MAX_SUFFIX
}

/// Top `k` vector-bearing words by the weaker of their two prompt similarities.
///
/// The anchor, the target and their variants are excluded. Ties keep
/// vocabulary order.
pub fn lexical_union(
    snapshot: &VocabularySnapshot,
    anchor: &str,
    target: &str,
    anchor_vector: &[f32],
    target_vector: &[f32],
    k: usize,
) -> Vec<LexicalCandidate> {
    if k == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<(f64, &str, &Vector)> = snapshot
        .iter_with_vectors()
        .filter(|(word, _)| {
            !is_morphological_variant(word, anchor) && !is_morphological_variant(word, target)
        })
        .map(|(word, vector)| {
            let score = cosine_similarity(vector, anchor_vector)
                .min(cosine_similarity(vector, target_vector));
            (score, word, vector)
        })
        .collect();

    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    ranked.truncate(k);

    ranked
        .into_iter()
        .map(|(score, word, vector)| LexicalCandidate {
            word: word.to_string(),
            score,
            vector: vector.clone(),
        })
        .collect()
}

/// The `k` vector-bearing words most similar to `seed_vector`, best first.
///
/// Only the seed itself is skipped; its variants stay in, since they are the
/// neighbours a player is most likely to reach for.
pub fn nearest_words(
    snapshot: &VocabularySnapshot,
    seed: &str,
    seed_vector: &[f32],
    k: usize,
) -> Vec<LexicalCandidate> {
    if k == 0 {
        return Vec::new();
    }
    let seed = normalize_word(seed);

    let mut ranked: Vec<(f64, &str, &Vector)> = snapshot
        .iter_with_vectors()
        .filter(|(word, _)| *word != seed)
        .map(|(word, vector)| (cosine_similarity(vector, seed_vector), word, vector))
        .collect();

    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    ranked.truncate(k);

    ranked
        .into_iter()
        .map(|(score, word, vector)| LexicalCandidate {
            word: word.to_string(),
            score,
            vector: vector.clone(),
        })
        .collect()
}
