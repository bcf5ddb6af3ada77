//! Analyzed query structures
//!
//! Output of the upstream analyzer and input of the relation splitter:
//! query specs, filter clauses and join pairs.

pub mod join_pair;
pub mod limits;
mod query_spec;
mod where_clause;

pub use join_pair::{JoinPair, JoinType};
pub use query_spec::{OrderBy, QuerySpec, SortDirection, SortItem};
pub use where_clause::{HavingClause, WhereClause};
