//! Query specification
//!
//! A [`QuerySpec`] is the clause bundle of either the whole query or one
//! relation's sub-query: filter, grouping, ordering, paging and outputs.

use crate::planner::{PlannerError, PlannerResult};
use crate::symbol::aggregations::contains_aggregation;
use crate::symbol::SymbolRef;

use super::where_clause::{HavingClause, WhereClause};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// One ORDER BY item
#[derive(Debug, Clone, PartialEq)]
pub struct SortItem {
    pub symbol: SymbolRef,
    pub direction: SortDirection,
    /// Explicit NULLS FIRST/LAST, `None` for the default
    pub nulls_first: Option<bool>,
}

impl SortItem {
    pub fn asc(symbol: SymbolRef) -> Self {
        Self {
            symbol,
            direction: SortDirection::Asc,
            nulls_first: None,
        }
    }

    pub fn desc(symbol: SymbolRef) -> Self {
        Self {
            symbol,
            direction: SortDirection::Desc,
            nulls_first: None,
        }
    }
}

/// ORDER BY clause
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    items: Vec<SortItem>,
}

impl OrderBy {
    pub fn new(items: Vec<SortItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[SortItem] {
        &self.items
    }

    /// Ordering expressions, in clause order
    pub fn symbols(&self) -> impl Iterator<Item = &SymbolRef> {
        self.items.iter().map(|i| &i.symbol)
    }
}

/// Clause bundle of a query or sub-query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    where_clause: WhereClause,
    having: Option<HavingClause>,
    group_by: Option<Vec<SymbolRef>>,
    order_by: Option<OrderBy>,
    limit: Option<SymbolRef>,
    offset: Option<SymbolRef>,
    outputs: Option<Vec<SymbolRef>>,
}

impl QuerySpec {
    /// Creates an empty spec: match-all filter, no clauses, outputs unset
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_where(mut self, where_clause: WhereClause) -> Self {
        self.where_clause = where_clause;
        self
    }

    /// Sets the WHERE predicate, normalizing boolean literals
    pub fn with_query(self, query: SymbolRef) -> Self {
        self.with_where(WhereClause::from_query(query))
    }

    pub fn with_having(mut self, having: HavingClause) -> Self {
        self.having = Some(having);
        self
    }

    pub fn with_group_by(mut self, group_by: Vec<SymbolRef>) -> Self {
        self.group_by = Some(group_by);
        self
    }

    pub fn with_order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn with_limit(mut self, limit: SymbolRef) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: SymbolRef) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Builder form of [`QuerySpec::set_outputs`] for specs produced by the
    /// analyzer, which always come with their outputs.
    pub fn with_outputs(mut self, outputs: Vec<SymbolRef>) -> Self {
        self.outputs = Some(outputs);
        self
    }

    pub fn where_clause(&self) -> &WhereClause {
        &self.where_clause
    }

    pub fn set_where(&mut self, where_clause: WhereClause) {
        self.where_clause = where_clause;
    }

    /// ANDs `predicate` into the WHERE clause
    pub fn add_where(&mut self, predicate: SymbolRef) {
        let current = std::mem::take(&mut self.where_clause);
        self.where_clause = current.add(predicate);
    }

    pub fn having(&self) -> Option<&HavingClause> {
        self.having.as_ref()
    }

    /// ANDs `predicate` into HAVING, creating the clause if needed
    pub fn add_having(&mut self, predicate: SymbolRef) {
        match &mut self.having {
            Some(having) => having.add(predicate),
            None => self.having = Some(HavingClause::new(predicate)),
        }
    }

    pub fn group_by(&self) -> Option<&[SymbolRef]> {
        self.group_by.as_deref()
    }

    pub fn order_by(&self) -> Option<&OrderBy> {
        self.order_by.as_ref()
    }

    pub fn set_order_by(&mut self, order_by: Option<OrderBy>) {
        self.order_by = order_by;
    }

    pub fn limit(&self) -> Option<&SymbolRef> {
        self.limit.as_ref()
    }

    pub fn set_limit(&mut self, limit: Option<SymbolRef>) {
        self.limit = limit;
    }

    pub fn offset(&self) -> Option<&SymbolRef> {
        self.offset.as_ref()
    }

    pub fn outputs(&self) -> Option<&[SymbolRef]> {
        self.outputs.as_deref()
    }

    /// Sets the output list. Outputs are assigned exactly once; a second
    /// assignment is an orchestration bug.
    pub fn set_outputs(&mut self, outputs: Vec<SymbolRef>) -> PlannerResult<()> {
        if self.outputs.is_some() {
            return Err(PlannerError::invariant_violation(
                "query spec outputs were already set",
            ));
        }
        self.outputs = Some(outputs);
        Ok(())
    }

    /// True if any output, ordering expression or HAVING predicate contains
    /// an aggregate
    pub fn has_aggregates(&self) -> bool {
        let in_outputs = self
            .outputs()
            .map(|outputs| outputs.iter().any(|s| contains_aggregation(s)))
            .unwrap_or(false);
        let in_order_by = self
            .order_by
            .as_ref()
            .map(|o| o.symbols().any(|s| contains_aggregation(s)))
            .unwrap_or(false);
        let in_having = self
            .having
            .as_ref()
            .map(|h| contains_aggregation(h.query()))
            .unwrap_or(false);
        in_outputs || in_order_by || in_having
    }
}
