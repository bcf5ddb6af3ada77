//! Tri-state filter clauses

use crate::symbol::{Symbol, SymbolRef};

/// Filter of a query or relation.
///
/// The two constant states are explicit so that the no-match short-circuit is
/// checked exhaustively instead of being a literal hidden inside a predicate.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WhereClause {
    /// No filter: every row matches
    #[default]
    MatchAll,
    /// Unsatisfiable filter: no row matches
    NoMatch,
    /// Rows must satisfy the predicate
    Query(SymbolRef),
}

impl WhereClause {
    /// Wraps a predicate, folding boolean and null literals into the
    /// constant states.
    ///
    /// Only a bare literal is folded. Constant expressions such as `1 = 0`
    /// are expected to be normalized before they reach the splitter and stay
    /// a plain `Query` here.
    pub fn from_query(query: SymbolRef) -> Self {
        match query.as_ref() {
            Symbol::Literal(serde_json::Value::Bool(true)) => WhereClause::MatchAll,
            Symbol::Literal(serde_json::Value::Bool(false))
            | Symbol::Literal(serde_json::Value::Null) => WhereClause::NoMatch,
            _ => WhereClause::Query(query),
        }
    }

    pub fn has_query(&self) -> bool {
        matches!(self, WhereClause::Query(_))
    }

    pub fn no_match(&self) -> bool {
        matches!(self, WhereClause::NoMatch)
    }

    pub fn query(&self) -> Option<&SymbolRef> {
        match self {
            WhereClause::Query(q) => Some(q),
            _ => None,
        }
    }

    /// True when evaluating this clause can drop rows that are not already
    /// dropped by a constant: a real predicate, not a literal.
    pub fn needs_filtering(&self) -> bool {
        match self {
            WhereClause::Query(q) => !q.is_literal(),
            WhereClause::MatchAll | WhereClause::NoMatch => false,
        }
    }

    /// ANDs `predicate` into this clause. A no-match clause stays no-match.
    pub fn add(self, predicate: SymbolRef) -> Self {
        match self {
            WhereClause::MatchAll => WhereClause::Query(predicate),
            WhereClause::NoMatch => WhereClause::NoMatch,
            WhereClause::Query(existing) => WhereClause::Query(Symbol::and(existing, predicate)),
        }
    }
}

/// HAVING clause, evaluated after grouping
#[derive(Debug, Clone, PartialEq)]
pub struct HavingClause {
    query: SymbolRef,
}

impl HavingClause {
    pub fn new(query: SymbolRef) -> Self {
        Self { query }
    }

    pub fn query(&self) -> &SymbolRef {
        &self.query
    }

    /// ANDs `predicate` into the clause
    pub fn add(&mut self, predicate: SymbolRef) {
        self.query = Symbol::and(self.query.clone(), predicate);
    }
}
