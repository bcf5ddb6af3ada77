//! relsplit - split multi-relation queries into per-relation sub-queries
//!
//! Given a query over several joined relations, decides which filters can run
//! inside each relation, which LIMITs can be pushed down, which fields must
//! survive to the post-join merge and which can be fetched lazily.

pub mod analyze;
pub mod cli;
pub mod config;
pub mod observability;
pub mod planner;
pub mod relation;
pub mod request;
pub mod symbol;
