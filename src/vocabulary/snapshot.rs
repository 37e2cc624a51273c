use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::index;
use serde::Deserialize;
use tokio::time::Instant;

use super::error::VocabularyError;
use crate::constants::Vector;

/// One row of a vocabulary source.
///
/// JSONL form: `{"word": "ocean", "frequency_rank": 812, "vector": [..]}`;
/// `frequency_rank` and `vector` may be omitted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VocabularyEntry {
    pub word: String,
    #[serde(default)]
    pub frequency_rank: u32,
    #[serde(default)]
    pub vector: Option<Vec<f32>>,
}

impl VocabularyEntry {
    pub fn new(word: impl Into<String>, frequency_rank: u32) -> Self {
        Self {
            word: word.into(),
            frequency_rank,
            vector: None,
        }
    }

    pub fn with_vector(mut self, vector: Vec<f32>) -> Self {
        self.vector = Some(vector);
        self
    }
}

/// Immutable, indexed view of the vocabulary at one load.
///
/// Words are stored lowercased and trimmed. `with_vectors` lists the
/// positions that carry a vector, so vector-only sampling never scans.
#[derive(Debug)]
pub struct VocabularySnapshot {
    words: Vec<String>,
    ranks: Vec<u32>,
    vectors: Vec<Option<Vector>>,
    index: HashMap<String, usize>,
    with_vectors: Vec<usize>,
    loaded_at: DateTime<Utc>,
    built_at: Instant,
}

impl VocabularySnapshot {
    /// Builds a snapshot, dropping blank and duplicate words (first wins).
    ///
    /// Vectors are discarded when `load_vectors` is false. Returns
    /// [`VocabularyError::EmptySource`] if no word survives.
    pub fn build(
        entries: Vec<VocabularyEntry>,
        load_vectors: bool,
    ) -> Result<Self, VocabularyError> {
        let mut words = Vec::with_capacity(entries.len());
        let mut ranks = Vec::with_capacity(entries.len());
        let mut vectors = Vec::with_capacity(entries.len());
        let mut index = HashMap::with_capacity(entries.len());
        let mut with_vectors = Vec::new();

        for entry in entries {
            let word = normalize_word(&entry.word);
            if word.is_empty() || index.contains_key(&word) {
                continue;
            }

            let position = words.len();
            let vector = entry
                .vector
                .filter(|v| load_vectors && !v.is_empty())
                .map(Vector::from);
            if vector.is_some() {
                with_vectors.push(position);
            }

            index.insert(word.clone(), position);
            words.push(word);
            ranks.push(entry.frequency_rank);
            vectors.push(vector);
        }

        if words.is_empty() {
            return Err(VocabularyError::EmptySource);
        }

        Ok(Self {
            words,
            ranks,
            vectors,
            index,
            with_vectors,
            loaded_at: Utc::now(),
            built_at: Instant::now(),
        })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of words that carry a vector.
    pub fn vector_count(&self) -> usize {
        self.with_vectors.len()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Time since this snapshot was built.
    pub fn age(&self) -> std::time::Duration {
        self.built_at.elapsed()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(&normalize_word(word))
    }

    pub fn position(&self, word: &str) -> Option<usize> {
        self.index.get(&normalize_word(word)).copied()
    }

    pub fn word(&self, position: usize) -> Option<&str> {
        self.words.get(position).map(String::as_str)
    }

    pub fn frequency_rank(&self, word: &str) -> Option<u32> {
        self.position(word).map(|p| self.ranks[p])
    }

    pub fn vector(&self, word: &str) -> Option<&Vector> {
        self.position(word)
            .and_then(|p| self.vectors[p].as_ref())
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// Vector-bearing words in load order.
    pub fn iter_with_vectors(&self) -> impl Iterator<Item = (&str, &Vector)> {
        self.with_vectors.iter().filter_map(|&p| {
            self.vectors[p]
                .as_ref()
                .map(|v| (self.words[p].as_str(), v))
        })
    }

    /// `n` distinct words, uniformly without replacement.
    pub fn sample_words<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        n: usize,
    ) -> Result<Vec<String>, VocabularyError> {
        let positions = sample_positions(rng, self.words.len(), n)?;
        Ok(positions
            .into_iter()
            .map(|p| self.words[p].clone())
            .collect())
    }

    /// `n` distinct vector-bearing words with their vectors.
    pub fn sample_with_vectors<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        n: usize,
    ) -> Result<Vec<(String, Vector)>, VocabularyError> {
        let picks = sample_positions(rng, self.with_vectors.len(), n)?;
        Ok(picks
            .into_iter()
            .filter_map(|i| {
                let p = self.with_vectors[i];
                self.vectors[p]
                    .clone()
                    .map(|v| (self.words[p].clone(), v))
            })
            .collect())
    }

    /// `n` distinct vectors, without the words (bootstrap hot path).
    pub fn sample_vectors<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        n: usize,
    ) -> Result<Vec<Vector>, VocabularyError> {
        let picks = sample_positions(rng, self.with_vectors.len(), n)?;
        Ok(picks
            .into_iter()
            .filter_map(|i| self.vectors[self.with_vectors[i]].clone())
            .collect())
    }
}

/// Canonical form used for vocabulary lookups.
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

fn sample_positions<R: Rng + ?Sized>(
    rng: &mut R,
    available: usize,
    requested: usize,
) -> Result<Vec<usize>, VocabularyError> {
    if requested > available {
        return Err(VocabularyError::InsufficientVocabulary {
            requested,
            available,
        });
    }
    Ok(index::sample(rng, available, requested).into_vec())
}
