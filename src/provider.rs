//! Errors and call helpers shared by the remote providers (embedding, assistant).

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Failure of a remote provider call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The call did not finish within its deadline.
    #[error("{provider} timed out after {after:?}")]
    Timeout {
        provider: String,
        after: Duration,
    },

    /// The upstream answered with a non-success status.
    #[error("{provider} returned {status}: {message}")]
    Upstream {
        provider: String,
        status: u16,
        message: String,
    },

    /// The upstream answered, but the body was not what we expected.
    #[error("{provider} returned a malformed response: {reason}")]
    Malformed { provider: String, reason: String },

    /// The request never reached the upstream (DNS, TLS, connection reset).
    #[error("{provider} transport failure: {reason}")]
    Transport { provider: String, reason: String },
}

impl ProviderError {
    pub fn malformed(provider: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }

    pub fn transport(provider: &str, reason: impl Into<String>) -> Self {
        Self::Transport {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for [`ProviderError::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Timeout { .. })
    }
}

/// Runs `call` with a deadline, mapping expiry to [`ProviderError::Timeout`].
pub async fn call_with_timeout<T, F>(
    provider: &str,
    after: Duration,
    call: F,
) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout(after, call).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout {
            provider: provider.to_string(),
            after,
        }),
    }
}
