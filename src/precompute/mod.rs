//! Eager per-entity precomputation.
//!
//! A job embeds the prompt words, optionally asks the assistant for bridge
//! suggestions, derives a lexical baseline and draws null samples against the
//! actual prompt. Results accumulate in a write-once bag that callers read at
//! any time through [`PrecomputeOrchestrator::get_result`].

pub mod config;
pub mod error;
pub mod job;
pub mod orchestrator;
pub mod params;
mod tasks;


pub use config::{CapacityPolicy, PrecomputeConfig};
pub use error::PrecomputeError;
pub use job::{JobStatus, PartialResult, PrecomputeJob, ResultBag, ResultField};
pub use orchestrator::{OrchestratorStats, PrecomputeOrchestrator, StartOutcome};
pub use params::PrecomputeParams;
