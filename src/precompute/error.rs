use thiserror::Error;

/// Errors returned by `start_precompute`.
///
/// Sub-task failures never surface here; they are recorded on the job.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PrecomputeError {
    /// The job map is full and every retained job is still running.
    #[error("precompute capacity of {limit} jobs exceeded")]
    CapacityExceeded { limit: usize },

    #[error("invalid precompute parameters: {reason}")]
    InvalidParams { reason: String },
}
