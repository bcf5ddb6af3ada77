//! CLI argument definitions using clap
//!
//! Commands:
//! - relsplit split <request> [--config <path>] [--format text|json]
//! - relsplit validate <request>

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// relsplit - split multi-relation queries into per-relation sub-queries
#[derive(Parser, Debug)]
#[command(name = "relsplit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split a request and print what each relation receives
    Split {
        /// Path to the JSON request
        request: PathBuf,

        /// Path to a splitter configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Resolve a request and validate its join conditions
    Validate {
        /// Path to the JSON request
        request: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
