//! Explain output for a split
//!
//! Produces deterministic, human-readable (and JSON) output describing
//! what each relation receives and what stays above the join.

use std::fmt;

use serde::Serialize;

use crate::analyze::{QuerySpec, WhereClause};
use crate::relation::RelationArena;

use super::errors::PlannerError;
use super::relation_splitter::RelationSplit;

/// Explain output of one relation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationExplain {
    pub name: String,
    pub where_clause: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub having: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    pub outputs: Vec<String>,
}

/// Explain output of a whole split
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitExplain {
    pub accepted: bool,
    pub relations: Vec<RelationExplain>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residual_where: Option<String>,
    pub required_for_merge: Vec<String>,
    pub fetchable: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

fn render_where(clause: &WhereClause, arena: &RelationArena) -> String {
    match clause {
        WhereClause::MatchAll => "MATCH_ALL".to_string(),
        WhereClause::NoMatch => "NO_MATCH".to_string(),
        WhereClause::Query(q) => arena.display(q).to_string(),
    }
}

fn explain_relation(name: String, spec: &QuerySpec, arena: &RelationArena) -> RelationExplain {
    RelationExplain {
        name,
        where_clause: render_where(spec.where_clause(), arena),
        having: spec.having().map(|h| arena.display(h.query()).to_string()),
        limit: spec.limit().map(|l| arena.display(l).to_string()),
        outputs: spec
            .outputs()
            .unwrap_or(&[])
            .iter()
            .map(|o| arena.display(o).to_string())
            .collect(),
    }
}

impl SplitExplain {
    /// Creates an explain from a finished split
    pub fn from_split(split: &RelationSplit, arena: &RelationArena) -> Self {
        let relations = arena
            .iter()
            .filter_map(|(id, relation)| {
                split
                    .spec(id)
                    .map(|spec| explain_relation(relation.name().to_string(), spec, arena))
            })
            .collect();

        Self {
            accepted: true,
            relations,
            residual_where: Some(render_where(split.query_spec().where_clause(), arena)),
            required_for_merge: split
                .required_for_merge()
                .iter()
                .map(|s| arena.display(s).to_string())
                .collect(),
            fetchable: split
                .can_be_fetched()
                .iter()
                .map(|f| arena.field_name(f))
                .collect(),
            rejection_code: None,
            rejection_reason: None,
        }
    }

    /// Creates an explain from a planning error
    pub fn from_error(err: &PlannerError) -> Self {
        Self {
            accepted: false,
            relations: Vec::new(),
            residual_where: None,
            required_for_merge: Vec::new(),
            fetchable: Vec::new(),
            rejection_code: Some(err.code().code().to_string()),
            rejection_reason: Some(err.message().to_string()),
        }
    }
}

impl fmt::Display for SplitExplain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== RELATION SPLIT ===")?;

        if !self.accepted {
            writeln!(f, "Status: REJECTED")?;
            if let Some(code) = &self.rejection_code {
                writeln!(f, "Error Code: {}", code)?;
            }
            if let Some(reason) = &self.rejection_reason {
                writeln!(f, "Reason: {}", reason)?;
            }
            return Ok(());
        }

        writeln!(f, "Status: ACCEPTED")?;
        for relation in &self.relations {
            writeln!(f, "Relation: {}", relation.name)?;
            writeln!(f, "  Where: {}", relation.where_clause)?;
            if let Some(having) = &relation.having {
                writeln!(f, "  Having: {}", having)?;
            }
            if let Some(limit) = &relation.limit {
                writeln!(f, "  Limit: {}", limit)?;
            }
            writeln!(f, "  Outputs: [{}]", relation.outputs.join(", "))?;
        }
        if let Some(residual) = &self.residual_where {
            writeln!(f, "Residual Where: {}", residual)?;
        }
        if !self.required_for_merge.is_empty() {
            writeln!(f, "Required For Merge: [{}]", self.required_for_merge.join(", "))?;
        }
        if !self.fetchable.is_empty() {
            writeln!(f, "Fetchable: [{}]", self.fetchable.join(", "))?;
        }
        Ok(())
    }
}
