//! Predicate splitting by relation set
//!
//! A WHERE predicate is flattened into its top-level conjuncts. Conjuncts
//! that reference exactly the same set of relations are ANDed back together,
//! so the result maps each relation set to one predicate.
//!
//! Only AND nodes are flattened. Anything below an OR or NOT stays one atomic
//! conjunct: splitting across those would change the result.

use std::collections::BTreeSet;

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::relation::RelationId;
use crate::symbol::fields::relations_of;
use crate::symbol::{operators, Symbol, SymbolRef};

/// Set of relations a conjunct references
pub type RelationSet = BTreeSet<RelationId>;

/// Conjuncts grouped by relation set, in first-occurrence order
pub type SplitQueries = IndexMap<RelationSet, SymbolRef>;

pub struct QuerySplitter;

impl QuerySplitter {
    /// Groups the conjuncts of `query` by the relations they reference.
    ///
    /// Singleton sets are push-down candidates; sets of two or more relations
    /// are residual; the empty set holds conjuncts without any field.
    pub fn split(query: &SymbolRef) -> SplitQueries {
        let mut splits = SplitQueries::new();
        for conjunct in Self::conjuncts(query) {
            match splits.entry(relations_of(&conjunct)) {
                Entry::Occupied(mut entry) => {
                    let merged = Symbol::and(entry.get().clone(), conjunct);
                    *entry.get_mut() = merged;
                }
                Entry::Vacant(entry) => {
                    entry.insert(conjunct);
                }
            }
        }
        splits
    }

    /// Flattens nested AND nodes into their operands, left to right
    pub fn conjuncts(query: &SymbolRef) -> Vec<SymbolRef> {
        let mut out = Vec::new();
        Self::collect_conjuncts(query, &mut out);
        out
    }

    fn collect_conjuncts(symbol: &SymbolRef, out: &mut Vec<SymbolRef>) {
        match symbol.as_ref() {
            Symbol::Function(function) if function.name == operators::AND => {
                for arg in &function.args {
                    Self::collect_conjuncts(arg, out);
                }
            }
            _ => out.push(symbol.clone()),
        }
    }
}
