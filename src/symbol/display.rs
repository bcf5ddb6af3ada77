//! SQL-like rendering of symbols
//!
//! Field names need their relation's qualified name, so rendering goes
//! through the arena: `arena.display(&symbol)`.

use std::fmt;

use serde_json::Value;

use crate::relation::RelationArena;

use super::operators;
use super::symbol::{Field, Symbol};

/// `Display` adapter returned by [`RelationArena::display`]
pub struct SymbolDisplay<'a> {
    symbol: &'a Symbol,
    arena: &'a RelationArena,
}

impl RelationArena {
    pub fn display<'a>(&'a self, symbol: &'a Symbol) -> SymbolDisplay<'a> {
        SymbolDisplay {
            symbol,
            arena: self,
        }
    }

    /// Renders a field as `relation.column`
    pub fn field_name(&self, field: &Field) -> String {
        format!("{}.{}", self.name_of(field.relation), field.name)
    }
}

impl fmt::Display for SymbolDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_symbol(f, self.symbol, self.arena, true)
    }
}

fn write_symbol(
    f: &mut fmt::Formatter<'_>,
    symbol: &Symbol,
    arena: &RelationArena,
    top: bool,
) -> fmt::Result {
    match symbol {
        Symbol::Literal(Value::String(s)) => write!(f, "'{}'", s.replace('\'', "''")),
        Symbol::Literal(Value::Null) => write!(f, "NULL"),
        Symbol::Literal(v) => write!(f, "{}", v),
        Symbol::Parameter(i) => write!(f, "${}", i + 1),
        Symbol::Field(field) => write!(f, "{}", arena.field_name(field)),
        Symbol::Function(function) => {
            if function.name == operators::NOT && function.args.len() == 1 {
                write!(f, "NOT ")?;
                return write_symbol(f, &function.args[0], arena, false);
            }
            if let (Some(token), [left, right]) =
                (operators::infix_token(&function.name), function.args.as_slice())
            {
                if !top {
                    write!(f, "(")?;
                }
                write_symbol(f, left, arena, false)?;
                write!(f, " {} ", token)?;
                write_symbol(f, right, arena, false)?;
                if !top {
                    write!(f, ")")?;
                }
                return Ok(());
            }
            write!(f, "{}(", function.name)?;
            write_args(f, function.args.iter().map(|a| a.as_ref()), arena)?;
            write!(f, ")")
        }
        Symbol::Aggregation(aggregation) => {
            write!(f, "{}(", aggregation.name)?;
            write_args(f, aggregation.inputs.iter().map(|a| a.as_ref()), arena)?;
            write!(f, ")")
        }
        Symbol::MatchPredicate(predicate) => {
            write!(f, "MATCH((")?;
            for (i, (field, boost)) in predicate.idents.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arena.field_name(field))?;
                if let Some(boost) = boost {
                    write!(f, " {}", boost)?;
                }
            }
            write!(f, "), '{}')", predicate.query_term)?;
            if !predicate.match_type.is_empty() {
                write!(f, " USING {}", predicate.match_type)?;
            }
            Ok(())
        }
    }
}

fn write_args<'s>(
    f: &mut fmt::Formatter<'_>,
    args: impl Iterator<Item = &'s Symbol>,
    arena: &RelationArena,
) -> fmt::Result {
    for (i, arg) in args.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write_symbol(f, arg, arena, true)?;
    }
    Ok(())
}
