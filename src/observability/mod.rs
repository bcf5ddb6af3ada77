//! Observability for relsplit
//!
//! Structured logging through `tracing`. Every log line carries a typed
//! [`Event`] name in the `event` field plus key/value context.
//!
//! # Principles
//!
//! 1. Observability is read-only: it never changes a split result
//! 2. The library only emits; installing a subscriber is the binary's job
//!
//! # Usage
//!
//! ```ignore
//! use relsplit::observability::{init_logging, Event};
//!
//! init_logging("info");
//! tracing::info!(event = %Event::SplitComplete, relations = 2, "split complete");
//! ```

mod events;

pub use events::Event;

use tracing_subscriber::EnvFilter;

/// Installs a stderr `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive`. Returns false if a global subscriber was already set.
pub fn init_logging(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
