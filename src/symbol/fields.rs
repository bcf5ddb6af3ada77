//! Field collection
//!
//! Walks expression trees and yields every [`Field`] leaf in pre-order,
//! left to right. This is how every other component learns which relations
//! an expression depends on.

use std::collections::BTreeSet;

use indexmap::IndexSet;

use crate::relation::RelationId;

use super::symbol::{Field, Symbol, SymbolRef};

/// Calls `consumer` for every field reachable from `symbol`, duplicates included
pub fn visit_fields<F>(symbol: &Symbol, consumer: &mut F)
where
    F: FnMut(&Field),
{
    match symbol {
        Symbol::Literal(_) | Symbol::Parameter(_) => {}
        Symbol::Field(field) => consumer(field),
        Symbol::Function(function) => {
            for arg in &function.args {
                visit_fields(arg, consumer);
            }
        }
        Symbol::Aggregation(aggregation) => {
            for input in &aggregation.inputs {
                visit_fields(input, consumer);
            }
        }
        Symbol::MatchPredicate(predicate) => {
            for (field, _) in &predicate.idents {
                consumer(field);
            }
        }
    }
}

/// [`visit_fields`] over a list of symbols, in list order
pub fn visit_fields_all<'a, I, F>(symbols: I, consumer: &mut F)
where
    I: IntoIterator<Item = &'a SymbolRef>,
    F: FnMut(&Field),
{
    for symbol in symbols {
        visit_fields(symbol, consumer);
    }
}

/// Distinct fields of `symbol` in first-occurrence order
pub fn collect_fields(symbol: &Symbol) -> IndexSet<Field> {
    let mut fields = IndexSet::new();
    visit_fields(symbol, &mut |f: &Field| {
        fields.insert(f.clone());
    });
    fields
}

/// Distinct fields of all `symbols` in first-occurrence order
pub fn collect_fields_all<'a>(symbols: impl IntoIterator<Item = &'a SymbolRef>) -> IndexSet<Field> {
    let mut fields = IndexSet::new();
    visit_fields_all(symbols, &mut |f: &Field| {
        fields.insert(f.clone());
    });
    fields
}

/// Set of relations referenced by `symbol`
pub fn relations_of(symbol: &Symbol) -> BTreeSet<RelationId> {
    let mut relations = BTreeSet::new();
    visit_fields(symbol, &mut |f: &Field| {
        relations.insert(f.relation);
    });
    relations
}
