//! Expression model
//!
//! Immutable, shareable expression trees over relation fields, plus the
//! utilities every planner component uses to inspect them:
//!
//! - [`fields`]: which fields (and so which relations) an expression touches
//! - [`aggregations`]: whether an expression contains an aggregate
//! - [`SymbolDisplay`]: SQL-like rendering for explain output

pub mod aggregations;
mod display;
pub mod fields;
pub mod operators;
mod symbol;

pub use display::SymbolDisplay;
pub use symbol::{Aggregation, Field, Function, MatchPredicate, Symbol, SymbolRef};
