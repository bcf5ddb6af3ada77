//! Join pairs of a multi-way join

use std::fmt;

use crate::relation::QualifiedName;
use crate::symbol::SymbolRef;

/// Join kind of a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Cross,
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    pub fn is_outer(&self) -> bool {
        matches!(self, JoinType::Left | JoinType::Right | JoinType::Full)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JoinType::Cross => "CROSS",
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
            JoinType::Full => "FULL",
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered pair of joined relations with an optional condition
#[derive(Debug, Clone)]
pub struct JoinPair {
    left: QualifiedName,
    right: QualifiedName,
    join_type: JoinType,
    condition: Option<SymbolRef>,
}

impl JoinPair {
    pub fn new(
        left: impl Into<QualifiedName>,
        right: impl Into<QualifiedName>,
        join_type: JoinType,
        condition: Option<SymbolRef>,
    ) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            join_type,
            condition,
        }
    }

    /// Inner join on `condition`
    pub fn inner(
        left: impl Into<QualifiedName>,
        right: impl Into<QualifiedName>,
        condition: SymbolRef,
    ) -> Self {
        Self::new(left, right, JoinType::Inner, Some(condition))
    }

    /// Cross join, no condition
    pub fn cross(left: impl Into<QualifiedName>, right: impl Into<QualifiedName>) -> Self {
        Self::new(left, right, JoinType::Cross, None)
    }

    pub fn left(&self) -> &QualifiedName {
        &self.left
    }

    pub fn right(&self) -> &QualifiedName {
        &self.right
    }

    pub fn join_type(&self) -> JoinType {
        self.join_type
    }

    pub fn condition(&self) -> Option<&SymbolRef> {
        self.condition.as_ref()
    }

    /// True if `relation` is a null-producing side of this pair: the right
    /// side of a LEFT join, the left side of a RIGHT join, either side of a
    /// FULL join.
    pub fn is_outer_relation(&self, relation: &QualifiedName) -> bool {
        match self.join_type {
            JoinType::Left => relation == &self.right,
            JoinType::Right => relation == &self.left,
            JoinType::Full => relation == &self.left || relation == &self.right,
            JoinType::Inner | JoinType::Cross => false,
        }
    }
}

/// True if `relation` is a null-producing side of any pair
pub fn is_outer_relation(relation: &QualifiedName, pairs: &[JoinPair]) -> bool {
    pairs.iter().any(|p| p.is_outer_relation(relation))
}
