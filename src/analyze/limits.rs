//! LIMIT/OFFSET arithmetic

use crate::symbol::{Symbol, SymbolRef};

/// Combines a limit and an offset into a single row bound.
///
/// The offset is folded additively: a relation below the join must deliver
/// `limit + offset` rows for the top level to be able to skip `offset` of
/// them. Integer literals are added eagerly; anything else (parameters,
/// expressions) becomes an `add` function.
pub fn merge_add(limit: Option<&SymbolRef>, offset: Option<&SymbolRef>) -> Option<SymbolRef> {
    match (limit, offset) {
        (None, None) => None,
        (Some(one), None) | (None, Some(one)) => Some(one.clone()),
        (Some(limit), Some(offset)) => match (limit.as_i64(), offset.as_i64()) {
            (Some(l), Some(o)) => Some(Symbol::literal(l.saturating_add(o))),
            _ => Some(Symbol::add(limit.clone(), offset.clone())),
        },
    }
}
