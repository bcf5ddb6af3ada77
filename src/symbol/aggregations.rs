//! Aggregation detection

use super::symbol::Symbol;

/// True if any node of `symbol` is an aggregate function
pub fn contains_aggregation(symbol: &Symbol) -> bool {
    match symbol {
        Symbol::Aggregation(_) => true,
        Symbol::Function(function) => function.args.iter().any(|a| contains_aggregation(a)),
        Symbol::Literal(_) | Symbol::Parameter(_) | Symbol::Field(_) | Symbol::MatchPredicate(_) => {
            false
        }
    }
}
