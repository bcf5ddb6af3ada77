//! relsplit CLI entry point
//!
//! This is a minimal entrypoint that:
//! 1. Installs the stderr log subscriber (`RUST_LOG`, default `warn`)
//! 2. Dispatches to CLI commands (via cli::run)
//! 3. Prints errors to stderr
//! 4. Exits with non-zero on failure
//!
//! All logic is delegated to the CLI module.

use relsplit::{cli, observability};

fn main() {
    observability::init_logging("warn");

    if let Err(e) = cli::run() {
        eprintln!("{}: {}", e.code(), e);
        std::process::exit(1);
    }
}
