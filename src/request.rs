//! Split requests
//!
//! A JSON description of a multi-relation query: the participating relations,
//! the join pairs and the top-level query. [`SplitRequest::lower`] resolves
//! every `relation.column` path against the declared relations and produces
//! the arena model the splitter works on.
//!
//! ```json
//! {
//!   "relations": [
//!     {"name": "a", "kind": "table", "columns": ["id", "x"]},
//!     {"name": "b", "kind": "table", "columns": ["id", "y"]}
//!   ],
//!   "join_pairs": [
//!     {"left": "a", "right": "b", "type": "left",
//!      "condition": {"call": {"name": "op_=", "args": [{"field": "a.id"}, {"field": "b.id"}]}}}
//!   ],
//!   "query": {
//!     "where": {"call": {"name": "op_>", "args": [{"field": "a.x"}, {"literal": 1}]}},
//!     "outputs": [{"field": "a.x"}, {"field": "b.y"}]
//!   }
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::analyze::{
    HavingClause, JoinPair, JoinType, OrderBy, QuerySpec, SortDirection, SortItem, WhereClause,
};
use crate::config::SplitterConfig;
use crate::observability::Event;
use crate::planner::{PlannerResult, RelationSplitter};
use crate::relation::{QualifiedName, Relation, RelationArena};
use crate::symbol::{Field, Symbol, SymbolRef};

/// Result type for request loading and lowering
pub type RequestResult<T> = Result<T, RequestError>;

/// Request errors
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Cannot read request file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid request JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate relation: {0}")]
    DuplicateRelation(String),

    #[error("Unknown relation: {0}")]
    UnknownRelation(String),

    #[error("Unknown column '{column}' in relation {relation}")]
    UnknownColumn { relation: String, column: String },

    #[error("Invalid field path '{0}': expected <relation>.<column>")]
    InvalidFieldPath(String),

    #[error("Table {0} must declare its columns")]
    MissingColumns(String),

    #[error("Derived relation {relation} names {columns} columns for {outputs} outputs")]
    ColumnCountMismatch {
        relation: String,
        columns: usize,
        outputs: usize,
    },

    #[error("Invalid boost in field '{0}'")]
    InvalidBoost(String),
}

fn default_true() -> bool {
    true
}

fn default_match_type() -> String {
    "best_fields".to_string()
}

/// Top-level request
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplitRequest {
    pub relations: Vec<RelationDef>,
    #[serde(default)]
    pub join_pairs: Vec<JoinPairDef>,
    pub query: QueryDef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKindDef {
    Table,
    Derived,
}

/// A participating relation
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationDef {
    pub name: String,
    pub kind: RelationKindDef,
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    /// Tables only: rows can be fetched after the join
    #[serde(default = "default_true")]
    pub fetch: bool,
    /// Derived only: the relations the sub-query reads from
    #[serde(default)]
    pub relations: Vec<RelationDef>,
    /// Derived only: the sub-query outputs
    #[serde(default)]
    pub outputs: Vec<ExprDef>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinTypeDef {
    Cross,
    #[default]
    Inner,
    Left,
    Right,
    Full,
}

impl From<JoinTypeDef> for JoinType {
    fn from(def: JoinTypeDef) -> Self {
        match def {
            JoinTypeDef::Cross => JoinType::Cross,
            JoinTypeDef::Inner => JoinType::Inner,
            JoinTypeDef::Left => JoinType::Left,
            JoinTypeDef::Right => JoinType::Right,
            JoinTypeDef::Full => JoinType::Full,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JoinPairDef {
    pub left: String,
    pub right: String,
    #[serde(default, rename = "type")]
    pub join_type: JoinTypeDef,
    #[serde(default)]
    pub condition: Option<ExprDef>,
}

/// The top-level query over the joined relations
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryDef {
    #[serde(default, rename = "where")]
    pub filter: Option<ExprDef>,
    /// The filter is statically known to match nothing
    #[serde(default)]
    pub no_match: bool,
    #[serde(default)]
    pub having: Option<ExprDef>,
    #[serde(default)]
    pub group_by: Option<Vec<ExprDef>>,
    #[serde(default)]
    pub order_by: Option<Vec<SortDef>>,
    #[serde(default)]
    pub limit: Option<ExprDef>,
    #[serde(default)]
    pub offset: Option<ExprDef>,
    pub outputs: Vec<ExprDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SortDef {
    pub expr: ExprDef,
    #[serde(default)]
    pub desc: bool,
    #[serde(default)]
    pub nulls_first: Option<bool>,
}

/// Expression, externally tagged
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprDef {
    /// `relation.column`
    Field(String),
    Literal(serde_json::Value),
    Param(usize),
    Call(CallDef),
    Agg(CallDef),
    Match(MatchDef),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallDef {
    pub name: String,
    #[serde(default)]
    pub args: Vec<ExprDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchDef {
    /// Field paths, optionally boosted as `relation.column^2.0`
    pub fields: Vec<String>,
    pub term: String,
    #[serde(default = "default_match_type", rename = "type")]
    pub match_type: String,
}

/// A request resolved into the arena model
#[derive(Debug, Clone)]
pub struct LoweredRequest {
    pub arena: RelationArena,
    pub join_pairs: Vec<JoinPair>,
    pub query: QuerySpec,
}

impl LoweredRequest {
    /// Creates a splitter over this request. The query spec is cloned so the
    /// request can be split more than once.
    pub fn splitter(&self, config: SplitterConfig) -> PlannerResult<RelationSplitter<'_>> {
        RelationSplitter::with_config(self.query.clone(), &self.arena, &self.join_pairs, config)
    }
}

impl SplitRequest {
    pub fn from_json(json: &str) -> RequestResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON request file
    pub fn load(path: &Path) -> RequestResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| RequestError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Resolves every relation, join pair and expression
    pub fn lower(&self) -> RequestResult<LoweredRequest> {
        let arena = lower_relations(&self.relations)?;

        let join_pairs = self
            .join_pairs
            .iter()
            .map(|pair| lower_join_pair(pair, &arena))
            .collect::<RequestResult<Vec<_>>>()?;

        let query = lower_query(&self.query, &arena)?;

        tracing::debug!(
            event = %Event::RequestLoaded,
            relations = arena.len(),
            join_pairs = join_pairs.len(),
            "request lowered"
        );

        Ok(LoweredRequest {
            arena,
            join_pairs,
            query,
        })
    }
}

fn lower_relations(defs: &[RelationDef]) -> RequestResult<RelationArena> {
    let mut arena = RelationArena::new();
    let mut seen = HashSet::new();

    for def in defs {
        if !seen.insert(def.name.as_str()) {
            return Err(RequestError::DuplicateRelation(def.name.clone()));
        }
        arena.add(lower_relation(def)?);
    }
    Ok(arena)
}

fn lower_relation(def: &RelationDef) -> RequestResult<Relation> {
    match def.kind {
        RelationKindDef::Table => {
            let columns = def
                .columns
                .clone()
                .ok_or_else(|| RequestError::MissingColumns(def.name.clone()))?;
            if def.fetch {
                Ok(Relation::table(def.name.as_str(), columns))
            } else {
                Ok(Relation::table_without_fetch(def.name.as_str(), columns))
            }
        }
        RelationKindDef::Derived => {
            let inner = lower_relations(&def.relations)?;
            let outputs = lower_exprs(&def.outputs, &inner)?;
            let columns = match &def.columns {
                Some(columns) if columns.len() != outputs.len() => {
                    return Err(RequestError::ColumnCountMismatch {
                        relation: def.name.clone(),
                        columns: columns.len(),
                        outputs: outputs.len(),
                    });
                }
                Some(columns) => columns.clone(),
                None => outputs
                    .iter()
                    .enumerate()
                    .map(|(i, output)| match output.as_field() {
                        Some(field) => field.name.clone(),
                        None => format!("col{}", i),
                    })
                    .collect(),
            };
            let spec = QuerySpec::new().with_outputs(outputs);
            Ok(Relation::derived(def.name.as_str(), columns, spec))
        }
    }
}

fn lower_join_pair(def: &JoinPairDef, arena: &RelationArena) -> RequestResult<JoinPair> {
    for name in [&def.left, &def.right] {
        if arena.find(&QualifiedName::parse(name)).is_none() {
            return Err(RequestError::UnknownRelation(name.clone()));
        }
    }
    let condition = def
        .condition
        .as_ref()
        .map(|c| lower_expr(c, arena))
        .transpose()?;
    Ok(JoinPair::new(
        def.left.as_str(),
        def.right.as_str(),
        def.join_type.into(),
        condition,
    ))
}

fn lower_query(def: &QueryDef, arena: &RelationArena) -> RequestResult<QuerySpec> {
    let where_clause = if def.no_match {
        WhereClause::NoMatch
    } else {
        match &def.filter {
            Some(filter) => WhereClause::from_query(lower_expr(filter, arena)?),
            None => WhereClause::MatchAll,
        }
    };

    let mut spec = QuerySpec::new()
        .with_where(where_clause)
        .with_outputs(lower_exprs(&def.outputs, arena)?);

    if let Some(having) = &def.having {
        spec = spec.with_having(HavingClause::new(lower_expr(having, arena)?));
    }
    if let Some(group_by) = &def.group_by {
        spec = spec.with_group_by(lower_exprs(group_by, arena)?);
    }
    if let Some(order_by) = &def.order_by {
        let items = order_by
            .iter()
            .map(|item| {
                Ok(SortItem {
                    symbol: lower_expr(&item.expr, arena)?,
                    direction: if item.desc {
                        SortDirection::Desc
                    } else {
                        SortDirection::Asc
                    },
                    nulls_first: item.nulls_first,
                })
            })
            .collect::<RequestResult<Vec<_>>>()?;
        spec = spec.with_order_by(OrderBy::new(items));
    }
    if let Some(limit) = &def.limit {
        spec = spec.with_limit(lower_expr(limit, arena)?);
    }
    if let Some(offset) = &def.offset {
        spec = spec.with_offset(lower_expr(offset, arena)?);
    }
    Ok(spec)
}

fn lower_exprs(defs: &[ExprDef], arena: &RelationArena) -> RequestResult<Vec<SymbolRef>> {
    defs.iter().map(|def| lower_expr(def, arena)).collect()
}

fn lower_expr(def: &ExprDef, arena: &RelationArena) -> RequestResult<SymbolRef> {
    match def {
        ExprDef::Field(path) => Ok(Symbol::field(resolve_field(path, arena)?)),
        ExprDef::Literal(value) => Ok(Symbol::literal(value.clone())),
        ExprDef::Param(index) => Ok(Symbol::parameter(*index)),
        ExprDef::Call(call) => Ok(Symbol::function(
            call.name.as_str(),
            lower_exprs(&call.args, arena)?,
        )),
        ExprDef::Agg(call) => Ok(Symbol::aggregation(
            call.name.as_str(),
            lower_exprs(&call.args, arena)?,
        )),
        ExprDef::Match(m) => {
            let idents = m
                .fields
                .iter()
                .map(|path| resolve_boosted_field(path, arena))
                .collect::<RequestResult<Vec<_>>>()?;
            Ok(Symbol::match_predicate(
                idents,
                m.term.as_str(),
                m.match_type.as_str(),
            ))
        }
    }
}

/// Resolves `relation.column`. The relation name may itself be qualified
/// (`doc.users.name`); the last segment is always the column.
fn resolve_field(path: &str, arena: &RelationArena) -> RequestResult<Field> {
    let (relation_name, column) = path
        .rsplit_once('.')
        .filter(|(r, c)| !r.is_empty() && !c.is_empty())
        .ok_or_else(|| RequestError::InvalidFieldPath(path.to_string()))?;

    let id = arena
        .find(&QualifiedName::parse(relation_name))
        .ok_or_else(|| RequestError::UnknownRelation(relation_name.to_string()))?;
    let index = arena
        .get(id)
        .and_then(|relation| relation.column_index(column))
        .ok_or_else(|| RequestError::UnknownColumn {
            relation: relation_name.to_string(),
            column: column.to_string(),
        })?;

    Ok(Field::new(id, index, column))
}

fn resolve_boosted_field(path: &str, arena: &RelationArena) -> RequestResult<(Field, Option<f64>)> {
    match path.split_once('^') {
        None => Ok((resolve_field(path, arena)?, None)),
        Some((field, boost)) => {
            let boost = boost
                .parse::<f64>()
                .map_err(|_| RequestError::InvalidBoost(path.to_string()))?;
            Ok((resolve_field(field, arena)?, Some(boost)))
        }
    }
}
