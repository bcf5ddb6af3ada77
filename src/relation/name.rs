//! Qualified relation names

use std::fmt;

/// Name of a relation as it appears in the query, e.g. `doc.users` or `t1`.
///
/// Names are unique within a single query. They identify a relation for join
/// pairs only; maps owned by the splitter are keyed by [`super::RelationId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    parts: Vec<String>,
}

impl QualifiedName {
    /// Creates a name from its dot-separated parts
    pub fn new(parts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses `schema.table` style text. Empty segments are dropped.
    pub fn parse(text: &str) -> Self {
        Self::new(text.split('.').filter(|p| !p.is_empty()))
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Last part of the name
    pub fn suffix(&self) -> Option<&str> {
        self.parts.last().map(String::as_str)
    }
}

impl From<&str> for QualifiedName {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts.join("."))
    }
}
