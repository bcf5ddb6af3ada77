//! Relation Split Tests
//!
//! End-to-end tests of the three-phase splitter through the public API:
//! - Single-relation conjuncts move into relation specs
//! - Nothing is pushed below the null-producing side of an outer join
//! - A no-match filter reaches every relation
//! - LIMIT push-down gating
//! - Fetchable fields and merge-required fields stay disjoint

use relsplit::analyze::{JoinPair, JoinType, OrderBy, QuerySpec, SortItem, WhereClause};
use relsplit::config::SplitterConfig;
use relsplit::planner::{PlannerErrorCode, QuerySplitter, RelationSplit, RelationSplitter, Severity};
use relsplit::relation::{Relation, RelationArena, RelationId};
use relsplit::symbol::fields::collect_fields;
use relsplit::symbol::{Field, Symbol, SymbolRef};

// =============================================================================
// Helper Functions
// =============================================================================

struct Tables {
    arena: RelationArena,
    a: RelationId,
    b: RelationId,
}

impl Tables {
    /// `a(x, z)` and `b(y, w)`
    fn new() -> Self {
        let mut arena = RelationArena::new();
        let a = arena.add(Relation::table("a", ["x", "z"]));
        let b = arena.add(Relation::table("b", ["y", "w"]));
        Self { arena, a, b }
    }

    fn ax(&self) -> SymbolRef {
        Symbol::field(Field::new(self.a, 0, "x"))
    }

    fn az(&self) -> SymbolRef {
        Symbol::field(Field::new(self.a, 1, "z"))
    }

    fn by(&self) -> SymbolRef {
        Symbol::field(Field::new(self.b, 0, "y"))
    }

    fn bw(&self) -> SymbolRef {
        Symbol::field(Field::new(self.b, 1, "w"))
    }

    fn outputs(&self) -> Vec<SymbolRef> {
        vec![self.ax(), self.by()]
    }

    fn split(&self, query: QuerySpec, pairs: &[JoinPair]) -> RelationSplit {
        RelationSplitter::new(query, &self.arena, pairs)
            .unwrap()
            .process()
            .unwrap()
    }
}

/// `A.x = 1 AND B.y = 2 AND A.z + B.w > 3`
fn example_where(t: &Tables) -> (SymbolRef, SymbolRef, SymbolRef, SymbolRef) {
    let on_a = Symbol::eq(t.ax(), Symbol::literal(1));
    let on_b = Symbol::eq(t.by(), Symbol::literal(2));
    let on_both = Symbol::gt(Symbol::add(t.az(), t.bw()), Symbol::literal(3));
    let full = Symbol::and(Symbol::and(on_a.clone(), on_b.clone()), on_both.clone());
    (full, on_a, on_b, on_both)
}

fn pushed(split: &RelationSplit, relation: RelationId) -> Option<SymbolRef> {
    split
        .spec(relation)
        .and_then(|spec| spec.where_clause().query().cloned())
}

// =============================================================================
// WHERE Push-Down Tests
// =============================================================================

/// Inner join: each single-relation conjunct moves down, the rest stays.
#[test]
fn test_inner_join_pushes_single_relation_conjuncts() {
    let t = Tables::new();
    let (full, on_a, on_b, on_both) = example_where(&t);
    let query = QuerySpec::new().with_query(full).with_outputs(t.outputs());
    let pairs = vec![JoinPair::new("a", "b", JoinType::Inner, None)];

    let split = t.split(query, &pairs);

    assert_eq!(pushed(&split, t.a), Some(on_a));
    assert_eq!(pushed(&split, t.b), Some(on_b));
    assert_eq!(split.query_spec().where_clause().query(), Some(&on_both));
}

/// Left join: the null-producing side receives nothing.
#[test]
fn test_left_join_keeps_outer_side_predicate_in_residual() {
    let t = Tables::new();
    let (full, on_a, on_b, on_both) = example_where(&t);
    let query = QuerySpec::new().with_query(full).with_outputs(t.outputs());
    let pairs = vec![JoinPair::new("a", "b", JoinType::Left, None)];

    let split = t.split(query, &pairs);

    assert_eq!(pushed(&split, t.a), Some(on_a));
    assert_eq!(split.spec(t.b).unwrap().where_clause(), &WhereClause::MatchAll);
    assert_eq!(
        split.query_spec().where_clause().query(),
        Some(&Symbol::and(on_b, on_both))
    );
}

/// Right join: the left relation is the null-producing side.
#[test]
fn test_right_join_keeps_left_side_predicate_in_residual() {
    let t = Tables::new();
    let (full, _, on_b, _) = example_where(&t);
    let query = QuerySpec::new().with_query(full).with_outputs(t.outputs());
    let pairs = vec![JoinPair::new("a", "b", JoinType::Right, None)];

    let split = t.split(query, &pairs);

    assert_eq!(pushed(&split, t.a), None);
    assert_eq!(pushed(&split, t.b), Some(on_b));
}

/// Full join: nothing is pushed at all.
#[test]
fn test_full_join_pushes_nothing() {
    let t = Tables::new();
    let (full, _, _, _) = example_where(&t);
    let query = QuerySpec::new().with_query(full).with_outputs(t.outputs());
    let pairs = vec![JoinPair::new("a", "b", JoinType::Full, None)];

    let split = t.split(query, &pairs);

    assert_eq!(pushed(&split, t.a), None);
    assert_eq!(pushed(&split, t.b), None);
    let residual = split.query_spec().where_clause().query().unwrap();
    assert_eq!(QuerySplitter::conjuncts(residual).len(), 3);
}

/// Pushed predicates plus the residual cover every original conjunct exactly once.
#[test]
fn test_predicate_coverage() {
    let t = Tables::new();
    let (full, _, _, _) = example_where(&t);
    let original = QuerySplitter::conjuncts(&full);

    for join_type in [JoinType::Inner, JoinType::Left, JoinType::Right, JoinType::Full] {
        let query = QuerySpec::new()
            .with_query(full.clone())
            .with_outputs(t.outputs());
        let pairs = vec![JoinPair::new("a", "b", join_type, None)];
        let split = t.split(query, &pairs);

        let mut covered = Vec::new();
        for id in [t.a, t.b] {
            if let Some(p) = pushed(&split, id) {
                covered.extend(QuerySplitter::conjuncts(&p));
            }
        }
        if let Some(residual) = split.query_spec().where_clause().query() {
            covered.extend(QuerySplitter::conjuncts(residual));
        }

        assert_eq!(covered.len(), original.len(), "join type {}", join_type);
        for conjunct in &original {
            assert!(covered.contains(conjunct), "join type {}", join_type);
        }
    }
}

/// OR is never split, even when each branch touches one relation.
#[test]
fn test_disjunction_stays_in_residual() {
    let t = Tables::new();
    let either = Symbol::or(
        Symbol::eq(t.ax(), Symbol::literal(1)),
        Symbol::eq(t.by(), Symbol::literal(2)),
    );
    let query = QuerySpec::new()
        .with_query(either.clone())
        .with_outputs(t.outputs());

    let split = t.split(query, &[JoinPair::cross("a", "b")]);

    assert_eq!(pushed(&split, t.a), None);
    assert_eq!(pushed(&split, t.b), None);
    assert_eq!(split.query_spec().where_clause().query(), Some(&either));
}

/// A no-match filter is copied to every relation.
#[test]
fn test_no_match_propagates_to_every_relation() {
    let t = Tables::new();
    let query = QuerySpec::new()
        .with_where(WhereClause::NoMatch)
        .with_outputs(t.outputs());

    let split = t.split(query, &[JoinPair::cross("a", "b")]);

    for spec in split.specs() {
        assert!(spec.where_clause().no_match());
    }
    assert!(split.query_spec().where_clause().no_match());
}

/// Two structurally identical sub-queries are still two relations.
#[test]
fn test_identical_derived_relations_are_split_separately() {
    let mut arena = RelationArena::new();
    let t = arena.add(Relation::table("t", ["id"]));
    let inner = QuerySpec::new().with_outputs(vec![Symbol::field(Field::new(t, 0, "id"))]);
    let s1 = arena.add(Relation::derived("s1", ["id"], inner.clone()));
    let s2 = arena.add(Relation::derived("s2", ["id"], inner));

    let on_s1 = Symbol::eq(Symbol::field(Field::new(s1, 0, "id")), Symbol::literal(1));
    let on_s2 = Symbol::eq(Symbol::field(Field::new(s2, 0, "id")), Symbol::literal(2));
    let query = QuerySpec::new()
        .with_query(Symbol::and(on_s1.clone(), on_s2.clone()))
        .with_outputs(Vec::new());
    let pairs = vec![JoinPair::cross("s1", "s2")];

    let split = RelationSplitter::new(query, &arena, &pairs)
        .unwrap()
        .process()
        .unwrap();

    assert_eq!(pushed(&split, s1), Some(on_s1));
    assert_eq!(pushed(&split, s2), Some(on_s2));
    assert_eq!(pushed(&split, t), None);
}

// =============================================================================
// Join Condition Validation Tests
// =============================================================================

/// MATCH across two relations is rejected in a join condition.
#[test]
fn test_match_join_condition_rejected() {
    let t = Tables::new();
    let condition = Symbol::match_predicate(
        vec![(Field::new(t.a, 0, "x"), None), (Field::new(t.b, 0, "y"), None)],
        "foo",
        "best_fields",
    );
    let pairs = vec![JoinPair::inner("a", "b", condition)];

    let err = RelationSplitter::new(QuerySpec::new(), &t.arena, &pairs)
        .err()
        .unwrap();
    assert_eq!(err.code(), PlannerErrorCode::InvalidJoinCondition);
    assert_eq!(err.severity(), Severity::Reject);
}

/// MATCH across two relations is rejected when it ends up in the residual.
#[test]
fn test_match_residual_rejected() {
    let t = Tables::new();
    let across = Symbol::match_predicate(
        vec![(Field::new(t.a, 0, "x"), Some(2.0)), (Field::new(t.b, 0, "y"), None)],
        "foo",
        "best_fields",
    );
    let query = QuerySpec::new().with_query(across).with_outputs(t.outputs());
    let pairs = vec![JoinPair::cross("a", "b")];

    let err = RelationSplitter::new(query, &t.arena, &pairs)
        .unwrap()
        .process()
        .unwrap_err();
    assert_eq!(err.code(), PlannerErrorCode::InvalidJoinCondition);
}

/// MATCH on a single relation is pushed like any other filter.
#[test]
fn test_single_relation_match_pushed_down() {
    let t = Tables::new();
    let on_a = Symbol::match_predicate(vec![(Field::new(t.a, 0, "x"), None)], "foo", "phrase");
    let query = QuerySpec::new()
        .with_query(on_a.clone())
        .with_outputs(t.outputs());

    let split = t.split(query, &[JoinPair::cross("a", "b")]);

    assert_eq!(pushed(&split, t.a), Some(on_a));
    assert_eq!(split.query_spec().where_clause(), &WhereClause::MatchAll);
}

// =============================================================================
// LIMIT Push-Down Tests
// =============================================================================

/// `SELECT * FROM a, b LIMIT 10` pushes the limit into both relations.
#[test]
fn test_limit_pushed_to_unconstrained_relations() {
    let t = Tables::new();
    let query = QuerySpec::new()
        .with_outputs(t.outputs())
        .with_limit(Symbol::literal(10));

    let split = t.split(query, &[JoinPair::cross("a", "b")]);

    for id in [t.a, t.b] {
        let limit = split.spec(id).unwrap().limit().and_then(|l| l.as_i64());
        assert_eq!(limit, Some(10));
    }
}

/// Offset is folded into the pushed limit.
#[test]
fn test_offset_folded_into_pushed_limit() {
    let t = Tables::new();
    let query = QuerySpec::new()
        .with_outputs(t.outputs())
        .with_limit(Symbol::literal(10))
        .with_offset(Symbol::literal(5));

    let split = t.split(query, &[JoinPair::cross("a", "b")]);

    let limit = split.spec(t.a).unwrap().limit().and_then(|l| l.as_i64());
    assert_eq!(limit, Some(15));
}

/// A parameterized limit is folded symbolically.
#[test]
fn test_parameter_limit_folded_as_addition() {
    let t = Tables::new();
    let query = QuerySpec::new()
        .with_outputs(t.outputs())
        .with_limit(Symbol::parameter(0))
        .with_offset(Symbol::literal(5));

    let split = t.split(query, &[JoinPair::cross("a", "b")]);

    assert_eq!(
        split.spec(t.b).unwrap().limit(),
        Some(&Symbol::add(Symbol::parameter(0), Symbol::literal(5)))
    );
}

/// Relations referenced by a join condition never receive the limit.
#[test]
fn test_limit_blocked_by_join_condition() {
    let t = Tables::new();
    let query = QuerySpec::new()
        .with_outputs(t.outputs())
        .with_limit(Symbol::literal(10));
    let pairs = vec![JoinPair::inner("a", "b", Symbol::eq(t.ax(), t.by()))];

    let split = t.split(query, &pairs);

    assert!(split.spec(t.a).unwrap().limit().is_none());
    assert!(split.spec(t.b).unwrap().limit().is_none());
}

/// A residual filter above the join blocks the limit.
#[test]
fn test_limit_blocked_by_residual_filter() {
    let t = Tables::new();
    let query = QuerySpec::new()
        .with_query(Symbol::gt(Symbol::add(t.az(), t.bw()), Symbol::literal(3)))
        .with_outputs(t.outputs())
        .with_limit(Symbol::literal(10));

    let split = t.split(query, &[JoinPair::cross("a", "b")]);

    assert!(split.specs().iter().all(|spec| spec.limit().is_none()));
}

/// ORDER BY above the join blocks the limit.
#[test]
fn test_limit_blocked_by_order_by() {
    let t = Tables::new();
    let query = QuerySpec::new()
        .with_outputs(t.outputs())
        .with_order_by(OrderBy::new(vec![SortItem::asc(t.ax())]))
        .with_limit(Symbol::literal(10));

    let split = t.split(query, &[JoinPair::cross("a", "b")]);

    assert!(split.specs().iter().all(|spec| spec.limit().is_none()));
}

/// A relation's own limit is never overwritten.
#[test]
fn test_existing_relation_limit_kept() {
    let t = Tables::new();
    let query = QuerySpec::new()
        .with_outputs(t.outputs())
        .with_limit(Symbol::literal(10));
    let pairs = vec![JoinPair::cross("a", "b")];

    let mut splitter = RelationSplitter::new(query, &t.arena, &pairs).unwrap();
    splitter
        .spec_mut(t.a)
        .unwrap()
        .set_limit(Some(Symbol::literal(3)));
    let split = splitter.process().unwrap();

    assert_eq!(split.spec(t.a).unwrap().limit().and_then(|l| l.as_i64()), Some(3));
    assert_eq!(split.spec(t.b).unwrap().limit().and_then(|l| l.as_i64()), Some(10));
}

/// Disabling limit push-down leaves every relation unlimited.
#[test]
fn test_limit_push_down_disabled_by_config() {
    let t = Tables::new();
    let query = QuerySpec::new()
        .with_outputs(t.outputs())
        .with_limit(Symbol::literal(10));
    let pairs = vec![JoinPair::cross("a", "b")];
    let config = SplitterConfig {
        limit_push_down: false,
        ..SplitterConfig::default()
    };

    let split = RelationSplitter::with_config(query, &t.arena, &pairs, config)
        .unwrap()
        .process()
        .unwrap();

    assert!(split.specs().iter().all(|spec| spec.limit().is_none()));
}

// =============================================================================
// Output and Fetch Tests
// =============================================================================

/// ORDER BY columns must be materialized, so they are never fetchable.
#[test]
fn test_fetchable_and_merge_required_are_disjoint() {
    let t = Tables::new();
    let query = QuerySpec::new()
        .with_outputs(vec![t.ax(), t.az(), t.by()])
        .with_order_by(OrderBy::new(vec![SortItem::desc(t.ax())]));

    let split = t.split(query, &[JoinPair::cross("a", "b")]);

    assert_eq!(split.required_for_merge(), &[t.ax()][..]);
    let ax = Field::new(t.a, 0, "x");
    assert!(!split.can_be_fetched().contains(&ax));
    assert!(split.can_be_fetched().contains(&Field::new(t.a, 1, "z")));
    assert!(split.can_be_fetched().contains(&Field::new(t.b, 0, "y")));

    for symbol in split.required_for_merge() {
        for field in collect_fields(symbol) {
            assert!(!split.can_be_fetched().contains(&field));
        }
    }
}

/// Fields used by the residual filter are carried through the join.
#[test]
fn test_residual_fields_are_not_fetchable() {
    let t = Tables::new();
    let query = QuerySpec::new()
        .with_query(Symbol::gt(Symbol::add(t.az(), t.bw()), Symbol::literal(3)))
        .with_outputs(vec![t.ax(), t.az()]);

    let split = t.split(query, &[JoinPair::cross("a", "b")]);

    let fetchable: Vec<_> = split.can_be_fetched().iter().cloned().collect();
    assert_eq!(fetchable, vec![Field::new(t.a, 0, "x")]);

    let a_outputs = split.spec(t.a).unwrap().outputs().unwrap();
    assert_eq!(a_outputs, &[t.az(), t.ax()][..]);
    let b_outputs = split.spec(t.b).unwrap().outputs().unwrap();
    assert_eq!(b_outputs, &[t.bw()][..]);
}

/// ORDER BY is not kept for the merge when the query aggregates.
#[test]
fn test_order_by_ignored_with_aggregates() {
    let t = Tables::new();
    let count = Symbol::aggregation("count", vec![t.ax()]);
    let query = QuerySpec::new()
        .with_outputs(vec![count.clone()])
        .with_order_by(OrderBy::new(vec![SortItem::asc(count)]));

    let split = t.split(query, &[JoinPair::cross("a", "b")]);

    assert!(split.required_for_merge().is_empty());
}

/// Relation outputs are assigned exactly once.
#[test]
fn test_outputs_assigned_once() {
    let t = Tables::new();
    let query = QuerySpec::new().with_outputs(t.outputs());

    let split = t.split(query, &[JoinPair::cross("a", "b")]);

    let mut spec = split.spec(t.a).unwrap().clone();
    let err = spec.set_outputs(Vec::new()).unwrap_err();
    assert_eq!(err.code(), PlannerErrorCode::InvariantViolation);
    assert!(err.is_fatal());
}

/// Same input, same split.
#[test]
fn test_split_is_deterministic() {
    let t = Tables::new();
    let (full, _, _, _) = example_where(&t);
    let pairs = vec![JoinPair::new("a", "b", JoinType::Left, None)];

    let first = t.split(
        QuerySpec::new().with_query(full.clone()).with_outputs(t.outputs()),
        &pairs,
    );
    for _ in 0..20 {
        let again = t.split(
            QuerySpec::new().with_query(full.clone()).with_outputs(t.outputs()),
            &pairs,
        );
        assert_eq!(again.specs(), first.specs());
        assert_eq!(again.query_spec(), first.query_spec());
    }
}

/// Ordering set on a relation by an earlier pass keeps its columns below the join.
#[test]
fn test_relation_order_by_fields_are_carried() {
    let t = Tables::new();
    let query = QuerySpec::new()
        .with_outputs(vec![t.ax(), t.bw()])
        .with_limit(Symbol::literal(10));
    let pairs = vec![JoinPair::cross("a", "b")];

    let mut splitter = RelationSplitter::new(query, &t.arena, &pairs).unwrap();
    splitter
        .spec_mut(t.b)
        .unwrap()
        .set_order_by(Some(OrderBy::new(vec![SortItem::asc(t.bw())])));
    let split = splitter.process().unwrap();

    assert!(!split.can_be_fetched().contains(&Field::new(t.b, 1, "w")));
    assert!(split.can_be_fetched().contains(&Field::new(t.a, 0, "x")));
    assert_eq!(split.spec(t.b).unwrap().outputs(), Some(&[t.bw()][..]));
    // The limit decision is taken before relation orderings are collected
    assert_eq!(split.spec(t.b).unwrap().limit().and_then(|l| l.as_i64()), Some(10));
}
