//! Relations participating in a multi-way join

mod arena;
mod name;

pub use arena::{Relation, RelationArena, RelationId, RelationKind};
pub use name::QualifiedName;
