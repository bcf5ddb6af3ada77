//! Fetch-field extraction
//!
//! A fetchable field is an output column that does not need to travel through
//! the join: the row id is carried instead and the value is fetched after the
//! join. Only plain base-table columns that no filter, grouping, ordering or
//! join condition needs qualify.

use indexmap::{IndexMap, IndexSet};

use crate::relation::{RelationArena, RelationId, RelationKind};
use crate::symbol::fields::visit_fields_all;
use crate::symbol::{Field, SymbolRef};

/// Fields collected per relation, in first-occurrence order
pub type FieldsByRelation = IndexMap<RelationId, IndexSet<Field>>;

/// Decides which output fields can be fetched after the join
pub trait FetchFieldExtractor {
    /// Returns the deferrable fields among `outputs`. Must not return a field
    /// already present in `fields_by_relation`.
    fn extract(
        &self,
        outputs: &[SymbolRef],
        fields_by_relation: &FieldsByRelation,
        arena: &RelationArena,
    ) -> IndexSet<Field>;
}

/// Default extractor: any output field of a fetch-capable base table that is
/// not otherwise required below the join.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnFetchExtractor;

impl FetchFieldExtractor for ColumnFetchExtractor {
    fn extract(
        &self,
        outputs: &[SymbolRef],
        fields_by_relation: &FieldsByRelation,
        arena: &RelationArena,
    ) -> IndexSet<Field> {
        let mut can_be_fetched = IndexSet::new();
        visit_fields_all(outputs, &mut |field: &Field| {
            let supports_fetch = matches!(
                arena.get(field.relation).map(|r| r.kind()),
                Some(RelationKind::Table {
                    fetch_supported: true,
                    ..
                })
            );
            let already_required = fields_by_relation
                .get(&field.relation)
                .map(|fields| fields.contains(field))
                .unwrap_or(false);
            if supports_fetch && !already_required {
                can_be_fetched.insert(field.clone());
            }
        });
        can_be_fetched
    }
}
