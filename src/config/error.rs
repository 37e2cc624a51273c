//! Errors raised while reading `INSIGHT_*` settings.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// `INSIGHT_PORT` parsed, but is zero.
    #[error("INSIGHT_PORT '{value}' is out of range (1-65535)")]
    InvalidPort { value: String },

    #[error("INSIGHT_PORT '{value}' is not a number: {source}")]
    PortParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("INSIGHT_BIND_ADDR '{value}' is not an IP address: {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// A numeric, list or enum setting failed to parse or is out of range.
    #[error("invalid value '{value}' for {name}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("vocabulary file not found: {path}")]
    PathNotFound { path: PathBuf },

    #[error("vocabulary path is not a regular file: {path}")]
    NotAFile { path: PathBuf },
}
