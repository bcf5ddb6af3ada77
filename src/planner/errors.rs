//! Planner error types
//!
//! Error codes:
//! - RELSPLIT_INVALID_JOIN_CONDITION (REJECT)
//! - RELSPLIT_INVARIANT_VIOLATION (FATAL)
//!
//! Every error aborts the current compilation. There is no partial result.

use std::fmt;

/// Severity levels for planner errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Query rejected, surfaced to the client
    Reject,
    /// Bug in the analyzer or orchestrator wiring
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Planner error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerErrorCode {
    /// Join condition or residual filter cannot be split per relation
    InvalidJoinCondition,
    /// Internal invariant broken (double output assignment, unknown relation)
    InvariantViolation,
}

impl PlannerErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            PlannerErrorCode::InvalidJoinCondition => "RELSPLIT_INVALID_JOIN_CONDITION",
            PlannerErrorCode::InvariantViolation => "RELSPLIT_INVARIANT_VIOLATION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            PlannerErrorCode::InvalidJoinCondition => Severity::Reject,
            PlannerErrorCode::InvariantViolation => Severity::Fatal,
        }
    }
}

impl fmt::Display for PlannerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Planner error type with full context
#[derive(Debug, Clone)]
pub struct PlannerError {
    code: PlannerErrorCode,
    message: String,
}

impl PlannerError {
    /// A join condition or residual contains a cross-relation MATCH
    pub fn invalid_join_condition(reason: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::InvalidJoinCondition,
            message: reason.into(),
        }
    }

    /// An internal invariant was broken
    pub fn invariant_violation(reason: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::InvariantViolation,
            message: reason.into(),
        }
    }

    /// A join pair names a relation that is not part of the query
    pub fn unknown_relation(name: impl fmt::Display) -> Self {
        Self::invariant_violation(format!(
            "Relation '{}' of a join pair is not part of the query",
            name
        ))
    }

    /// Returns the error code
    pub fn code(&self) -> PlannerErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for PlannerError {}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
