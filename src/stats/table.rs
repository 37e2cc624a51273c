use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::scoring::SampleScore;

/// Which score a lookup refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Relevance,
    Divergence,
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::Relevance => write!(f, "relevance"),
            Metric::Divergence => write!(f, "divergence"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DistributionSummary {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl DistributionSummary {
    /// Population statistics of `sorted`, which must be in ascending order.
    fn of_sorted(sorted: &[f64]) -> Self {
        let (Some(&min), Some(&max)) = (sorted.first(), sorted.last()) else {
            return Self::default();
        };
        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let variance = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        Self {
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
        }
    }
}

/// Sorted bootstrap samples for one `(context, sample_size)` pair.
#[derive(Debug, Clone, Serialize)]
pub struct NullDistributionTable {
    context: String,
    sample_size: usize,
    #[serde(skip)]
    relevance: Vec<f64>,
    #[serde(skip)]
    divergence: Vec<f64>,
    relevance_summary: DistributionSummary,
    divergence_summary: DistributionSummary,
    built_at: DateTime<Utc>,
}

impl NullDistributionTable {
    /// Builds a table from unsorted scores; NaN scores are dropped.
    pub fn from_scores(
        context: impl Into<String>,
        sample_size: usize,
        scores: &[SampleScore],
    ) -> Self {
        let mut relevance: Vec<f64> = scores
            .iter()
            .map(|s| s.relevance)
            .filter(|v| !v.is_nan())
            .collect();
        let mut divergence: Vec<f64> = scores
            .iter()
            .map(|s| s.divergence)
            .filter(|v| !v.is_nan())
            .collect();
        relevance.sort_by(f64::total_cmp);
        divergence.sort_by(f64::total_cmp);

        Self {
            context: context.into(),
            sample_size,
            relevance_summary: DistributionSummary::of_sorted(&relevance),
            divergence_summary: DistributionSummary::of_sorted(&divergence),
            relevance,
            divergence,
            built_at: Utc::now(),
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Number of bootstrap samples (relevance side).
    pub fn len(&self) -> usize {
        self.relevance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relevance.is_empty()
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Sorted samples for `metric`.
    pub fn samples(&self, metric: Metric) -> &[f64] {
        match metric {
            Metric::Relevance => &self.relevance,
            Metric::Divergence => &self.divergence,
        }
    }

    pub fn summary(&self, metric: Metric) -> DistributionSummary {
        match metric {
            Metric::Relevance => self.relevance_summary,
            Metric::Divergence => self.divergence_summary,
        }
    }

    /// Percentage of samples strictly below `observed`, in `[0, 100]`.
    ///
    /// O(log B) by binary search. An empty table answers `50.0`.
    pub fn percentile(&self, metric: Metric, observed: f64) -> f64 {
        let samples = self.samples(metric);
        if samples.is_empty() {
            return 50.0;
        }
        let below = samples.partition_point(|&s| s < observed);
        100.0 * below as f64 / samples.len() as f64
    }

    /// `(observed - mean) / std_dev`, or `0.0` for a degenerate distribution.
    pub fn z_score(&self, metric: Metric, observed: f64) -> f64 {
        let summary = self.summary(metric);
        if summary.std_dev > 0.0 {
            (observed - summary.mean) / summary.std_dev
        } else {
            0.0
        }
    }
}
