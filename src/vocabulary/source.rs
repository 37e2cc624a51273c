use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::error::VocabularyError;
use super::snapshot::VocabularyEntry;

/// Bulk loader for the vocabulary.
#[async_trait]
pub trait VocabularySource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Returns every entry; the pool handles normalization and dedupe.
    async fn load_all(&self) -> Result<Vec<VocabularyEntry>, VocabularyError>;
}

/// Reads one JSON object per line from a file.
#[derive(Debug, Clone)]
pub struct JsonlVocabularySource {
    path: PathBuf,
}

impl JsonlVocabularySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl VocabularySource for JsonlVocabularySource {
    fn name(&self) -> &str {
        "jsonl"
    }

    async fn load_all(&self) -> Result<Vec<VocabularyEntry>, VocabularyError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let entries = parse_jsonl(&content)?;
        debug!(path = %self.path.display(), entries = entries.len(), "Read vocabulary file");
        Ok(entries)
    }
}

/// Parses JSONL vocabulary text, skipping blank lines.
pub fn parse_jsonl(content: &str) -> Result<Vec<VocabularyEntry>, VocabularyError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| VocabularyError::Parse {
                line: i + 1,
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Built-in word list used when no vocabulary file is configured.
pub const FALLBACK_WORDS: &[&str] = &[
    "universe", "cosmos", "ocean", "mountain", "algorithm", "symphony", "crystal", "whisper",
    "thunder", "horizon", "paradox", "labyrinth", "enigma", "essence", "catalyst", "zenith",
    "nebula", "fortress", "cascade", "phantom", "quantum", "glacier", "volcano", "midnight",
    "twilight", "harmony", "discord", "serenity", "chaos", "wisdom", "ancient", "modern",
    "future", "memory", "destiny", "shadow", "light", "fire", "water", "earth", "storm", "calm",
    "dream", "reality", "illusion",
];

/// In-memory source; clones its entries on every load.
#[derive(Debug, Clone, Default)]
pub struct StaticVocabularySource {
    entries: Vec<VocabularyEntry>,
}

impl StaticVocabularySource {
    pub fn new(entries: Vec<VocabularyEntry>) -> Self {
        Self { entries }
    }

    /// Entries ranked by position, without vectors.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = words
            .into_iter()
            .enumerate()
            .map(|(i, w)| VocabularyEntry::new(w, i as u32 + 1))
            .collect();
        Self { entries }
    }

    /// The built-in [`FALLBACK_WORDS`] list.
    pub fn fallback() -> Self {
        Self::from_words(FALLBACK_WORDS.iter().copied())
    }

    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    /// Replaces the entries, e.g. after attaching vectors.
    pub fn with_entries(mut self, entries: Vec<VocabularyEntry>) -> Self {
        self.entries = entries;
        self
    }
}

#[async_trait]
impl VocabularySource for StaticVocabularySource {
    fn name(&self) -> &str {
        "static"
    }

    async fn load_all(&self) -> Result<Vec<VocabularyEntry>, VocabularyError> {
        Ok(self.entries.clone())
    }
}
