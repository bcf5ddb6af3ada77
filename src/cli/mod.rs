//! CLI module for relsplit
//!
//! Provides command-line interface for:
//! - split: split a request and print the per-relation specs
//! - validate: resolve a request and check its join conditions

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, OutputFormat};
pub use commands::{render_split, run, run_command, split, validate};
pub use errors::{CliError, CliResult};
