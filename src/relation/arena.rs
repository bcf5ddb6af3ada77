//! Relation arena
//!
//! Relations are compared by identity, never by shape: two uses of the same
//! sub-query are two participants. Every relation lives in a [`RelationArena`]
//! and is addressed by its stable [`RelationId`].

use std::fmt;

use crate::analyze::QuerySpec;

use super::name::QualifiedName;

/// Stable index of a relation inside its arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationId(usize);

impl RelationId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// What a relation is backed by
#[derive(Debug, Clone)]
pub enum RelationKind {
    /// A base table
    Table {
        /// Whether rows can be fetched lazily by document id after the join
        fetch_supported: bool,
    },
    /// A sub-query. Field indices point into the sub-query's outputs.
    Derived { spec: QuerySpec },
}

/// A participant of a multi-way join
#[derive(Debug, Clone)]
pub struct Relation {
    name: QualifiedName,
    /// Output column names; a field's index points into this list
    columns: Vec<String>,
    kind: RelationKind,
}

impl Relation {
    /// A base table supporting lazy fetch
    pub fn table(
        name: impl Into<QualifiedName>,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            kind: RelationKind::Table {
                fetch_supported: true,
            },
        }
    }

    /// A base table whose rows cannot be fetched after the join
    pub fn table_without_fetch(
        name: impl Into<QualifiedName>,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            kind: RelationKind::Table {
                fetch_supported: false,
            },
            ..Self::table(name, columns)
        }
    }

    /// A derived relation (sub-select). `columns` names the sub-query outputs.
    pub fn derived(
        name: impl Into<QualifiedName>,
        columns: impl IntoIterator<Item = impl Into<String>>,
        spec: QuerySpec,
    ) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            kind: RelationKind::Derived { spec },
        }
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn kind(&self) -> &RelationKind {
        &self.kind
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_table(&self) -> bool {
        matches!(self.kind, RelationKind::Table { .. })
    }

    /// Name of the output column at `index`
    pub fn column_name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(String::as_str)
    }

    /// Index of the output column called `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Owner of all relations participating in one query
#[derive(Debug, Clone, Default)]
pub struct RelationArena {
    relations: Vec<Relation>,
}

impl RelationArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a relation and returns its id. Names are not checked for
    /// uniqueness here; the request layer rejects duplicates.
    pub fn add(&mut self, relation: Relation) -> RelationId {
        let id = RelationId(self.relations.len());
        self.relations.push(relation);
        id
    }

    pub fn get(&self, id: RelationId) -> Option<&Relation> {
        self.relations.get(id.0)
    }

    /// Looks up a relation by name
    pub fn find(&self, name: &QualifiedName) -> Option<RelationId> {
        self.relations
            .iter()
            .position(|r| r.name() == name)
            .map(RelationId)
    }

    /// Ids in insertion order
    pub fn ids(&self) -> impl Iterator<Item = RelationId> + '_ {
        (0..self.relations.len()).map(RelationId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RelationId, &Relation)> {
        self.relations
            .iter()
            .enumerate()
            .map(|(i, r)| (RelationId(i), r))
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Name of a relation, or `?` for an id from another arena
    pub fn name_of(&self, id: RelationId) -> String {
        self.get(id)
            .map(|r| r.name().to_string())
            .unwrap_or_else(|| "?".to_string())
    }
}
