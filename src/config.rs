//! Splitter configuration
//!
//! Loaded from a JSON file. Every field has a default, so `{}` is a valid
//! configuration. The flags only gate optimizations; predicate placement is
//! never configurable.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::Event;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Splitter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplitterConfig {
    /// Push LIMIT (+ OFFSET) into relations that need no filtering
    #[serde(default = "default_true")]
    pub limit_push_down: bool,

    /// Compute the set of outputs that can be fetched after the join
    #[serde(default = "default_true")]
    pub fetch_extraction: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            limit_push_down: true,
            fetch_extraction: true,
        }
    }
}

impl SplitterConfig {
    /// Reads and parses a JSON configuration file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let path_str = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path_str.clone(),
            source,
        })?;
        let config: SplitterConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path_str.clone(),
                source,
            })?;

        tracing::info!(
            event = %Event::ConfigLoaded,
            path = %path_str,
            limit_push_down = config.limit_push_down,
            fetch_extraction = config.fetch_extraction,
            "configuration loaded"
        );
        Ok(config)
    }
}
