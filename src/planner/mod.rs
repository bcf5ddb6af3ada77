//! Join decomposition planner
//!
//! Splits the filtering, grouping, ordering and output requirements of a
//! multi-relation query into one sub-spec per relation.
//!
//! # Components
//!
//! - [`QuerySplitter`]: groups WHERE conjuncts by the relations they touch
//! - [`JoinConditionValidator`]: rejects MATCH predicates above the join
//! - [`RelationSplitter`]: the three-phase orchestrator
//! - [`FetchFieldExtractor`]: decides which outputs are fetched after the join
//!
//! # Guarantees
//!
//! - Predicates are never pushed below the null-producing side of an outer join
//! - The pushed predicates ANDed with the residual equal the original filter
//! - Fetchable fields and fields required for the merge are disjoint
//! - Relation outputs are assigned exactly once

mod errors;
mod explain;
mod fetch;
mod join_validator;
mod query_splitter;
mod relation_splitter;

pub use errors::{PlannerError, PlannerErrorCode, PlannerResult, Severity};
pub use explain::{RelationExplain, SplitExplain};
pub use fetch::{ColumnFetchExtractor, FetchFieldExtractor, FieldsByRelation};
pub use join_validator::JoinConditionValidator;
pub use query_splitter::{QuerySplitter, RelationSet, SplitQueries};
pub use relation_splitter::{RelationSplit, RelationSplitter};
