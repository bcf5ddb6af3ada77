//! Join condition validation
//!
//! Full-text scoring is relation-local, so a MATCH predicate cannot be
//! evaluated at the join level. A join condition, or a residual filter that
//! stays above the join, must not contain one anywhere in its tree.

use crate::symbol::Symbol;

use super::errors::{PlannerError, PlannerResult};

pub struct JoinConditionValidator;

impl JoinConditionValidator {
    /// Fails if `condition` contains a MATCH predicate at any depth
    pub fn validate(condition: &Symbol) -> PlannerResult<()> {
        match condition {
            Symbol::MatchPredicate(_) => Err(PlannerError::invalid_join_condition(
                "MATCH predicates cannot be evaluated above the join",
            )),
            Symbol::Function(function) => function
                .args
                .iter()
                .try_for_each(|arg| Self::validate(arg)),
            Symbol::Aggregation(aggregation) => aggregation
                .inputs
                .iter()
                .try_for_each(|input| Self::validate(input)),
            Symbol::Literal(_) | Symbol::Parameter(_) | Symbol::Field(_) => Ok(()),
        }
    }
}
