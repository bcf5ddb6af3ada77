//! Observable events of a split
//!
//! Events are explicit and typed. They are emitted through `tracing` as the
//! `event` field, so log consumers can filter on stable names.

use std::fmt;

/// Observable events during query splitting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Split of one query begins
    SplitBegin,
    /// All relation specs finalized
    SplitComplete,
    /// Split aborted with an error
    SplitRejected,

    // Order by
    /// ORDER BY expressions kept for the post-join merge
    OrderByRequiredForMerge,

    // Where
    /// Unsatisfiable WHERE copied to every relation
    WhereNoMatchPropagated,
    /// Single-relation predicate moved into the relation spec
    PredicatePushedDown,
    /// Predicate of a null-producing relation kept above the join
    PredicateKeptOuter,
    /// Remaining conjuncts installed as the top-level filter
    ResidualInstalled,

    // Outputs
    /// LIMIT (+ OFFSET) copied to a relation spec
    LimitPushedDown,
    /// Relation output list assigned
    OutputsFinalized,

    // Surfaces
    /// Configuration loaded from file
    ConfigLoaded,
    /// Split request parsed and lowered
    RequestLoaded,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SplitBegin => "SPLIT_BEGIN",
            Event::SplitComplete => "SPLIT_COMPLETE",
            Event::SplitRejected => "SPLIT_REJECTED",
            Event::OrderByRequiredForMerge => "ORDER_BY_REQUIRED_FOR_MERGE",
            Event::WhereNoMatchPropagated => "WHERE_NO_MATCH_PROPAGATED",
            Event::PredicatePushedDown => "PREDICATE_PUSHED_DOWN",
            Event::PredicateKeptOuter => "PREDICATE_KEPT_OUTER",
            Event::ResidualInstalled => "RESIDUAL_INSTALLED",
            Event::LimitPushedDown => "LIMIT_PUSHED_DOWN",
            Event::OutputsFinalized => "OUTPUTS_FINALIZED",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::RequestLoaded => "REQUEST_LOADED",
        }
    }

    /// Returns true if this event marks a failed compilation
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::SplitRejected)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
