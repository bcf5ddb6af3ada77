//! CLI-specific error types
//!
//! Every CLI error ends the process with exit code 1.

use thiserror::Error;

use crate::config::ConfigError;
use crate::planner::PlannerError;
use crate::request::RequestError;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("{0}")]
    Planner(#[from] PlannerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "RELSPLIT_CLI_CONFIG_ERROR",
            Self::Request(_) => "RELSPLIT_CLI_REQUEST_ERROR",
            Self::Planner(err) => err.code().code(),
            Self::Io(_) | Self::Json(_) => "RELSPLIT_CLI_IO_ERROR",
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
