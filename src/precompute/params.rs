use serde::{Deserialize, Serialize};

use super::error::PrecomputeError;
use crate::constants::{CONTEXT_UNION, DEFAULT_SUBMISSION_SIZE, DEFAULT_SUGGESTION_COUNT};

/// What to precompute for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecomputeParams {
    pub anchor: String,
    pub target: String,
    /// Scoring context of the null samples. Default: `"union"`.
    #[serde(default = "default_context")]
    pub context: String,
    /// Submission size the null samples simulate. Default: `5`.
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    /// Ask the assistant for bridge suggestions.
    #[serde(default)]
    pub assistant: bool,
    #[serde(default = "default_suggestion_count")]
    pub suggestion_count: usize,
}

fn default_context() -> String {
    CONTEXT_UNION.to_string()
}

fn default_sample_size() -> usize {
    DEFAULT_SUBMISSION_SIZE
}

fn default_suggestion_count() -> usize {
    DEFAULT_SUGGESTION_COUNT
}

impl PrecomputeParams {
    pub fn new(anchor: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            anchor: anchor.into(),
            target: target.into(),
            context: default_context(),
            sample_size: default_sample_size(),
            assistant: false,
            suggestion_count: default_suggestion_count(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn with_assistant(mut self, enabled: bool) -> Self {
        self.assistant = enabled;
        self
    }

    pub fn with_suggestion_count(mut self, count: usize) -> Self {
        self.suggestion_count = count;
        self
    }

    pub fn validate(&self) -> Result<(), PrecomputeError> {
        let invalid = |reason: &str| PrecomputeError::InvalidParams {
            reason: reason.to_string(),
        };

        if self.anchor.trim().is_empty() {
            return Err(invalid("anchor must not be blank"));
        }
        if self.target.trim().is_empty() {
            return Err(invalid("target must not be blank"));
        }
        if self.sample_size == 0 {
            return Err(invalid("sample_size must be positive"));
        }
        if self.assistant && self.suggestion_count == 0 {
            return Err(invalid("suggestion_count must be positive when the assistant is enabled"));
        }
        Ok(())
    }
}
