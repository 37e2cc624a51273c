//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `INSIGHT_*` environment variables.
//! Component tuning (cache sizes, TTLs, bootstrap counts) lives in the config
//! struct of each component; this module holds the process-level settings and
//! the shared env parsing helpers.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{DEFAULT_EMBEDDING_DIM, DEFAULT_EMBEDDING_MODEL, DEFAULT_OPENAI_BASE_URL};

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `INSIGHT_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP port of the monitoring server. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// JSONL vocabulary file. When unset the built-in fallback word list is used.
    pub vocabulary_path: Option<PathBuf>,

    /// Load vocabulary vectors (required for bootstrap sampling). Default: `true`.
    pub load_vectors: bool,

    /// API key for the embedding endpoint. When unset the stub embedder is used.
    pub openai_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API.
    pub openai_base_url: String,

    /// Embedding model name.
    pub embedding_model: String,

    /// Embedding dimension (also used by the stub embedder).
    pub embedding_dim: usize,

    /// Chat model for assistant suggestions. Unset disables the assistant sub-task.
    pub assistant_model: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            vocabulary_path: None,
            load_vectors: true,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            assistant_model: None,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "INSIGHT_PORT";
    const ENV_BIND_ADDR: &'static str = "INSIGHT_BIND_ADDR";
    const ENV_VOCABULARY_PATH: &'static str = "INSIGHT_VOCABULARY_PATH";
    const ENV_LOAD_VECTORS: &'static str = "INSIGHT_LOAD_VECTORS";
    const ENV_OPENAI_API_KEY: &'static str = "INSIGHT_OPENAI_API_KEY";
    const ENV_OPENAI_BASE_URL: &'static str = "INSIGHT_OPENAI_BASE_URL";
    const ENV_EMBEDDING_MODEL: &'static str = "INSIGHT_EMBEDDING_MODEL";
    const ENV_EMBEDDING_DIM: &'static str = "INSIGHT_EMBEDDING_DIM";
    const ENV_ASSISTANT_MODEL: &'static str = "INSIGHT_ASSISTANT_MODEL";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let vocabulary_path = optional_path_from_env(Self::ENV_VOCABULARY_PATH);
        let load_vectors = bool_from_env(Self::ENV_LOAD_VECTORS, defaults.load_vectors);
        let openai_api_key = optional_string_from_env(Self::ENV_OPENAI_API_KEY);
        let openai_base_url = string_from_env(Self::ENV_OPENAI_BASE_URL, defaults.openai_base_url);
        let embedding_model = string_from_env(Self::ENV_EMBEDDING_MODEL, defaults.embedding_model);
        let embedding_dim = parse_from_env(Self::ENV_EMBEDDING_DIM, defaults.embedding_dim)?;
        let assistant_model = optional_string_from_env(Self::ENV_ASSISTANT_MODEL);

        Ok(Self {
            port,
            bind_addr,
            vocabulary_path,
            load_vectors,
            openai_api_key,
            openai_base_url,
            embedding_model,
            embedding_dim,
            assistant_model,
        })
    }

    /// Validates paths and basic invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref path) = self.vocabulary_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }

        if self.embedding_dim == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_EMBEDDING_DIM,
                value: "0".to_string(),
                reason: "embedding dimension must be positive".to_string(),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }
}

pub(crate) fn optional_path_from_env(var_name: &str) -> Option<PathBuf> {
    optional_string_from_env(var_name).map(PathBuf::from)
}

pub(crate) fn optional_string_from_env(var_name: &str) -> Option<String> {
    env::var(var_name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn string_from_env(var_name: &str, default: String) -> String {
    optional_string_from_env(var_name).unwrap_or(default)
}

pub(crate) fn bool_from_env(var_name: &str, default: bool) -> bool {
    env::var(var_name)
        .map(|s| {
            let s = s.trim();
            s != "false" && s != "0"
        })
        .unwrap_or(default)
}

/// Parses a value if the variable is set; an unparsable value is an error
/// rather than a silent fallback.
pub(crate) fn parse_from_env<T>(var_name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_string_from_env(var_name) {
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            name: var_name,
            reason: e.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

pub(crate) fn secs_from_env(var_name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    parse_from_env(var_name, default.as_secs()).map(Duration::from_secs)
}

pub(crate) fn millis_from_env(
    var_name: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    parse_from_env(var_name, default.as_millis() as u64).map(Duration::from_millis)
}

/// Parses a comma-separated list such as `1,2,3`.
pub(crate) fn list_from_env(
    var_name: &'static str,
    default: Vec<usize>,
) -> Result<Vec<usize>, ConfigError> {
    let Some(value) = optional_string_from_env(var_name) else {
        return Ok(default);
    };

    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<usize>().map_err(|e| ConfigError::InvalidValue {
                name: var_name,
                value: value.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}
