//! Expression tree
//!
//! Symbols are immutable and shared through [`SymbolRef`]. The same sub-tree
//! may be reachable from the top-level spec and from several relation specs;
//! sharing never deep-copies.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde_json::Value;

use crate::relation::RelationId;

use super::operators;

/// Shared handle to an immutable expression
pub type SymbolRef = Arc<Symbol>;

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    /// Constant value
    Literal(Value),
    /// Bound statement parameter, references no relation
    Parameter(usize),
    /// Column of a relation
    Field(Field),
    /// Scalar function or operator application
    Function(Function),
    /// Full-text match over one or more fields
    MatchPredicate(MatchPredicate),
    /// Aggregate function application
    Aggregation(Aggregation),
}

/// Reference to the output column `index` of `relation`.
///
/// Identity is `(relation, index)`; `name` is carried for rendering only.
#[derive(Debug, Clone)]
pub struct Field {
    pub relation: RelationId,
    pub index: usize,
    pub name: String,
}

impl Field {
    pub fn new(relation: RelationId, index: usize, name: impl Into<String>) -> Self {
        Self {
            relation,
            index,
            name: name.into(),
        }
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.relation == other.relation && self.index == other.index
    }
}

impl Eq for Field {}

impl Hash for Field {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.relation.hash(state);
        self.index.hash(state);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub args: Vec<SymbolRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub name: String,
    pub inputs: Vec<SymbolRef>,
}

/// `MATCH((a.x 1.0, b.y), 'term')`
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPredicate {
    /// Matched fields with their optional boost
    pub idents: Vec<(Field, Option<f64>)>,
    pub query_term: String,
    pub match_type: String,
}

impl Symbol {
    pub fn literal(value: impl Into<Value>) -> SymbolRef {
        Arc::new(Symbol::Literal(value.into()))
    }

    pub fn parameter(index: usize) -> SymbolRef {
        Arc::new(Symbol::Parameter(index))
    }

    pub fn field(field: Field) -> SymbolRef {
        Arc::new(Symbol::Field(field))
    }

    pub fn function(name: impl Into<String>, args: Vec<SymbolRef>) -> SymbolRef {
        Arc::new(Symbol::Function(Function {
            name: name.into(),
            args,
        }))
    }

    pub fn aggregation(name: impl Into<String>, inputs: Vec<SymbolRef>) -> SymbolRef {
        Arc::new(Symbol::Aggregation(Aggregation {
            name: name.into(),
            inputs,
        }))
    }

    pub fn match_predicate(
        idents: Vec<(Field, Option<f64>)>,
        query_term: impl Into<String>,
        match_type: impl Into<String>,
    ) -> SymbolRef {
        Arc::new(Symbol::MatchPredicate(MatchPredicate {
            idents,
            query_term: query_term.into(),
            match_type: match_type.into(),
        }))
    }

    pub fn and(left: SymbolRef, right: SymbolRef) -> SymbolRef {
        Self::function(operators::AND, vec![left, right])
    }

    pub fn or(left: SymbolRef, right: SymbolRef) -> SymbolRef {
        Self::function(operators::OR, vec![left, right])
    }

    pub fn not(arg: SymbolRef) -> SymbolRef {
        Self::function(operators::NOT, vec![arg])
    }

    pub fn eq(left: SymbolRef, right: SymbolRef) -> SymbolRef {
        Self::function(operators::EQ, vec![left, right])
    }

    pub fn gt(left: SymbolRef, right: SymbolRef) -> SymbolRef {
        Self::function(operators::GT, vec![left, right])
    }

    pub fn lt(left: SymbolRef, right: SymbolRef) -> SymbolRef {
        Self::function(operators::LT, vec![left, right])
    }

    pub fn add(left: SymbolRef, right: SymbolRef) -> SymbolRef {
        Self::function(operators::ADD, vec![left, right])
    }

    /// Folds symbols into a left-deep AND tree. `None` for an empty input.
    pub fn and_all(symbols: impl IntoIterator<Item = SymbolRef>) -> Option<SymbolRef> {
        symbols.into_iter().reduce(Self::and)
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Symbol::Literal(_))
    }

    /// True for a function node with the given name
    pub fn is_function(&self, name: &str) -> bool {
        matches!(self, Symbol::Function(f) if f.name == name)
    }

    pub fn as_field(&self) -> Option<&Field> {
        match self {
            Symbol::Field(f) => Some(f),
            _ => None,
        }
    }

    /// Integer value of a literal, if it is one
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Symbol::Literal(v) => v.as_i64(),
            _ => None,
        }
    }
}
