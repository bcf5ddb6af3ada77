//! Relation splitter
//!
//! Splits a query over several joined relations into one [`QuerySpec`] per
//! relation so that each relation can be scanned and filtered on its own
//! before the join combines the partial results.
//!
//! Processing runs three phases in strict order, each depending on state
//! produced by the previous one:
//!
//! 1. ORDER BY analysis: which expressions must survive to the merge
//! 2. WHERE push-down: single-relation conjuncts move into relation specs
//! 3. Outputs: LIMIT push-down, fetchable fields, relation output lists
//!
//! [`RelationSplitter::process`] consumes the splitter, so a split can run
//! only once.

use std::collections::HashSet;

use indexmap::IndexSet;

use crate::analyze::join_pair::is_outer_relation;
use crate::analyze::limits::merge_add;
use crate::analyze::{JoinPair, QuerySpec, WhereClause};
use crate::config::SplitterConfig;
use crate::observability::Event;
use crate::relation::{RelationArena, RelationId, RelationKind};
use crate::symbol::aggregations::contains_aggregation;
use crate::symbol::fields::{visit_fields, visit_fields_all};
use crate::symbol::{Field, Symbol, SymbolRef};

use super::errors::{PlannerError, PlannerResult};
use super::fetch::{ColumnFetchExtractor, FetchFieldExtractor, FieldsByRelation};
use super::join_validator::JoinConditionValidator;
use super::query_splitter::{QuerySplitter, RelationSet};

static DEFAULT_EXTRACTOR: ColumnFetchExtractor = ColumnFetchExtractor;

/// Splits one query into per-relation specs
pub struct RelationSplitter<'a> {
    query_spec: QuerySpec,
    arena: &'a RelationArena,
    join_pairs: &'a [JoinPair],
    /// Indexed by `RelationId`
    specs: Vec<QuerySpec>,
    join_conditions: Vec<SymbolRef>,
    relations_in_join_conditions: HashSet<RelationId>,
    required_for_merge: Vec<SymbolRef>,
    config: SplitterConfig,
    fetch_extractor: &'a dyn FetchFieldExtractor,
}

/// Result of a split, handed read-only to the plan builder
#[derive(Debug, Clone)]
pub struct RelationSplit {
    query_spec: QuerySpec,
    specs: Vec<QuerySpec>,
    required_for_merge: Vec<SymbolRef>,
    can_be_fetched: IndexSet<Field>,
}

impl RelationSplit {
    /// The top-level spec; its WHERE now holds only the residual filter
    pub fn query_spec(&self) -> &QuerySpec {
        &self.query_spec
    }

    pub fn spec(&self, relation: RelationId) -> Option<&QuerySpec> {
        self.specs.get(relation.index())
    }

    /// Relation specs in arena order
    pub fn specs(&self) -> &[QuerySpec] {
        &self.specs
    }

    /// Expressions that must be materialized up to the post-join merge
    pub fn required_for_merge(&self) -> &[SymbolRef] {
        &self.required_for_merge
    }

    /// Output fields that can be fetched after the join
    pub fn can_be_fetched(&self) -> &IndexSet<Field> {
        &self.can_be_fetched
    }
}

impl<'a> RelationSplitter<'a> {
    /// Creates a splitter with the default configuration.
    ///
    /// Every join condition is validated eagerly, and every relation named by
    /// a join pair must be part of `arena`.
    pub fn new(
        query_spec: QuerySpec,
        arena: &'a RelationArena,
        join_pairs: &'a [JoinPair],
    ) -> PlannerResult<Self> {
        Self::with_config(query_spec, arena, join_pairs, SplitterConfig::default())
    }

    pub fn with_config(
        query_spec: QuerySpec,
        arena: &'a RelationArena,
        join_pairs: &'a [JoinPair],
        config: SplitterConfig,
    ) -> PlannerResult<Self> {
        let specs = arena.ids().map(|_| QuerySpec::new()).collect();
        let mut join_conditions = Vec::with_capacity(join_pairs.len());
        let mut relations_in_join_conditions = HashSet::with_capacity(join_pairs.len());

        for pair in join_pairs {
            let left = arena
                .find(pair.left())
                .ok_or_else(|| PlannerError::unknown_relation(pair.left()))?;
            let right = arena
                .find(pair.right())
                .ok_or_else(|| PlannerError::unknown_relation(pair.right()))?;

            if let Some(condition) = pair.condition() {
                JoinConditionValidator::validate(condition)?;
                join_conditions.push(condition.clone());
                relations_in_join_conditions.insert(left);
                relations_in_join_conditions.insert(right);
            }
        }

        Ok(Self {
            query_spec,
            arena,
            join_pairs,
            specs,
            join_conditions,
            relations_in_join_conditions,
            required_for_merge: Vec::new(),
            config,
            fetch_extractor: &DEFAULT_EXTRACTOR,
        })
    }

    /// Replaces the default fetch-field extractor
    pub fn with_fetch_extractor(mut self, extractor: &'a dyn FetchFieldExtractor) -> Self {
        self.fetch_extractor = extractor;
        self
    }

    /// Sub-spec of a relation, for passes that run before the split (for
    /// example one that already ordered or limited the relation)
    pub fn spec_mut(&mut self, relation: RelationId) -> Option<&mut QuerySpec> {
        self.specs.get_mut(relation.index())
    }

    /// Runs the three phases and returns the finished split
    pub fn process(mut self) -> PlannerResult<RelationSplit> {
        tracing::debug!(
            event = %Event::SplitBegin,
            relations = self.arena.len(),
            join_pairs = self.join_pairs.len(),
            "splitting query"
        );

        let result = self.run_phases();
        if let Err(err) = &result {
            tracing::warn!(event = %Event::SplitRejected, code = %err.code(), "{}", err.message());
        }
        let can_be_fetched = result?;

        tracing::debug!(
            event = %Event::SplitComplete,
            required_for_merge = self.required_for_merge.len(),
            fetchable = can_be_fetched.len(),
            "split complete"
        );

        Ok(RelationSplit {
            query_spec: self.query_spec,
            specs: self.specs,
            required_for_merge: self.required_for_merge,
            can_be_fetched,
        })
    }

    fn run_phases(&mut self) -> PlannerResult<IndexSet<Field>> {
        self.process_order_by();
        self.process_where()?;
        self.process_outputs()
    }

    /// Phase 1.
    ///
    /// A nested loop keeps the order of its left input, so the ORDER BY could
    /// move into a relation that is leftmost, not null-producing, and the only
    /// one referenced. Relations may be reordered after this pass, which
    /// breaks that assumption, so ordering is never pushed down; the ordering
    /// columns are kept up to the merge instead.
    fn process_order_by(&mut self) {
        let Some(order_by) = self.query_spec.order_by() else {
            return;
        };
        if self.query_spec.has_aggregates() || self.query_spec.group_by().is_some() {
            return;
        }
        for symbol in order_by.symbols() {
            if !self.required_for_merge.contains(symbol) {
                self.required_for_merge.push(symbol.clone());
            }
        }
        tracing::debug!(
            event = %Event::OrderByRequiredForMerge,
            symbols = self.required_for_merge.len(),
            "order by kept for merge"
        );
    }

    /// Phase 2
    fn process_where(&mut self) -> PlannerResult<()> {
        let query = match self.query_spec.where_clause() {
            WhereClause::NoMatch => {
                for spec in &mut self.specs {
                    spec.set_where(WhereClause::NoMatch);
                }
                tracing::debug!(
                    event = %Event::WhereNoMatchPropagated,
                    relations = self.specs.len(),
                    "where matches nothing"
                );
                return Ok(());
            }
            WhereClause::MatchAll => return Ok(()),
            WhereClause::Query(query) => query.clone(),
        };

        let arena = self.arena;
        let mut splits = QuerySplitter::split(&query);
        for (id, relation) in arena.iter() {
            let key = RelationSet::from([id]);
            if is_outer_relation(relation.name(), self.join_pairs) {
                // An outer join creates null rows. A filter applied before the
                // join cannot remove them, the same filter after the join can.
                if splits.contains_key(&key) {
                    tracing::debug!(
                        event = %Event::PredicateKeptOuter,
                        relation = %relation.name(),
                        "predicate stays above outer join"
                    );
                }
                continue;
            }
            let Some(predicate) = splits.shift_remove(&key) else {
                continue;
            };

            let spec = &mut self.specs[id.index()];
            let clause = match relation.kind() {
                RelationKind::Table { .. } => {
                    spec.add_where(predicate);
                    "where"
                }
                RelationKind::Derived { spec: inner } => {
                    apply_as_where_or_having(spec, predicate, inner)?
                }
            };
            tracing::debug!(
                event = %Event::PredicatePushedDown,
                relation = %relation.name(),
                clause,
                "predicate pushed down"
            );
        }

        match Symbol::and_all(splits.into_values()) {
            None => self.query_spec.set_where(WhereClause::MatchAll),
            Some(residual) => {
                JoinConditionValidator::validate(&residual)?;
                tracing::debug!(
                    event = %Event::ResidualInstalled,
                    residual = %arena.display(&residual),
                    "residual filter installed"
                );
                self.query_spec.set_where(WhereClause::Query(residual));
            }
        }
        Ok(())
    }

    /// Phase 3
    fn process_outputs(&mut self) -> PlannerResult<IndexSet<Field>> {
        let mut fields_by_relation = FieldsByRelation::new();

        if let Some(group_by) = self.query_spec.group_by() {
            add_fields_all(&mut fields_by_relation, group_by);
        }
        if let Some(having) = self.query_spec.having() {
            add_fields(&mut fields_by_relation, having.query());
        }
        if let Some(query) = self.query_spec.where_clause().query() {
            add_fields(&mut fields_by_relation, query);
        }
        add_fields_all(&mut fields_by_relation, &self.join_conditions);

        // Limit and offset only travel down if nothing after the join filters
        // or reorders rows, and only to relations outside join conditions.
        if self.config.limit_push_down {
            self.push_down_limit(&fields_by_relation);
        }

        for spec in &self.specs {
            if let Some(order_by) = spec.order_by() {
                add_fields_all(&mut fields_by_relation, order_by.symbols());
            }
        }

        let outputs = self.query_spec.outputs().unwrap_or(&[]);
        let mut can_be_fetched = if self.config.fetch_extraction {
            self.fetch_extractor
                .extract(outputs, &fields_by_relation, self.arena)
        } else {
            IndexSet::new()
        };

        for symbol in &self.required_for_merge {
            visit_fields(symbol, &mut |field: &Field| {
                can_be_fetched.shift_remove(field);
                add_field(&mut fields_by_relation, field);
            });
        }

        add_fields_all(&mut fields_by_relation, outputs);

        let arena = self.arena;
        for (id, spec) in arena.ids().zip(self.specs.iter_mut()) {
            let outputs: Vec<SymbolRef> = fields_by_relation
                .get(&id)
                .map(|fields| fields.iter().cloned().map(Symbol::field).collect())
                .unwrap_or_default();
            let count = outputs.len();
            spec.set_outputs(outputs).map_err(|_| {
                PlannerError::invariant_violation(format!(
                    "outputs of relation '{}' were already set",
                    arena.name_of(id)
                ))
            })?;
            tracing::trace!(
                event = %Event::OutputsFinalized,
                relation = %arena.name_of(id),
                outputs = count,
                "relation outputs finalized"
            );
        }

        Ok(can_be_fetched)
    }

    fn push_down_limit(&mut self, fields_by_relation: &FieldsByRelation) {
        let Some(limit) = self.query_spec.limit() else {
            return;
        };
        if self.query_spec.where_clause().needs_filtering() || self.query_spec.order_by().is_some() {
            return;
        }
        let limit_and_offset = merge_add(Some(limit), self.query_spec.offset());

        let arena = self.arena;
        for id in arena.ids() {
            if fields_by_relation.contains_key(&id) || self.relations_in_join_conditions.contains(&id) {
                continue;
            }
            let spec = &mut self.specs[id.index()];
            // A sub-select may carry its own limit, which takes precedence
            if spec.limit().is_some() {
                continue;
            }
            spec.set_limit(limit_and_offset.clone());
            tracing::debug!(
                event = %Event::LimitPushedDown,
                relation = %arena.name_of(id),
                "limit pushed down"
            );
        }
    }
}

/// Routes a predicate pushed into a derived relation. A filter on an
/// aggregated output of the sub-query has to run after its grouping, so it
/// becomes HAVING; anything else is WHERE.
fn apply_as_where_or_having(
    spec: &mut QuerySpec,
    predicate: SymbolRef,
    inner: &QuerySpec,
) -> PlannerResult<&'static str> {
    let inner_outputs = inner.outputs().unwrap_or(&[]);
    let mut has_aggregations = false;
    let mut missing = None;
    visit_fields(&predicate, &mut |field: &Field| match inner_outputs.get(field.index) {
        Some(output) => has_aggregations |= contains_aggregation(output),
        None => missing = Some(field.index),
    });
    if let Some(index) = missing {
        return Err(PlannerError::invariant_violation(format!(
            "field index {} is outside the outputs of a derived relation",
            index
        )));
    }

    if has_aggregations {
        spec.add_having(predicate);
        Ok("having")
    } else {
        spec.add_where(predicate);
        Ok("where")
    }
}

fn add_field(fields_by_relation: &mut FieldsByRelation, field: &Field) {
    fields_by_relation
        .entry(field.relation)
        .or_default()
        .insert(field.clone());
}

fn add_fields(fields_by_relation: &mut FieldsByRelation, symbol: &Symbol) {
    visit_fields(symbol, &mut |field: &Field| add_field(fields_by_relation, field));
}

fn add_fields_all<'s>(
    fields_by_relation: &mut FieldsByRelation,
    symbols: impl IntoIterator<Item = &'s SymbolRef>,
) {
    visit_fields_all(symbols, &mut |field: &Field| add_field(fields_by_relation, field));
}
