//! Bootstrap null distributions and percentile lookup.

pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod error;
pub mod table;

#[cfg(test)]
mod tests;

pub use bootstrap::{bootstrap_fixed_prompt, bootstrap_random_prompt};
pub use cache::{StatisticsCache, StatsCacheStats, TableStats};
pub use config::StatsConfig;
pub use error::StatsError;
pub use table::{DistributionSummary, Metric, NullDistributionTable};
