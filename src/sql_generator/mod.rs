//! SQL generation: walk the CQL AST and emit a parameterized boolean
//! expression.
//!
//! Two invariants carry the whole module:
//!
//! - Every user-supplied literal leaves this module as a `$n` bound
//!   parameter. Identifiers embedded in the fragment (table names, document
//!   columns, join columns) come from the validated schema registry, and
//!   field names from the parser are plain identifiers, so no query text is
//!   ever formatted into SQL.
//! - Cross-table predicates are correlated `EXISTS` subqueries, never
//!   structural JOINs. An `EXISTS` cannot multiply the outer row count, so a
//!   parent with N matching children is returned exactly once without any
//!   DISTINCT machinery.

use std::fmt;

use crate::cql_parser::ast::{BooleanOp, Comparison, ComparisonOp, CqlNode, SortKey};
use crate::resolver::{self, JoinPath, UnknownFieldError};
use crate::schema_catalog::{Cardinality, ForeignKeyEdge, SchemaRegistry, TableInfo};

pub mod errors;
mod pattern;

pub use errors::{SqlGenError, UnsupportedOperatorError};

/// The output of one compilation: a WHERE-clause fragment with `$n`
/// placeholders and the values bound to them, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    pub where_clause: String,
    pub order_by: Option<String>,
    pub parameters: Vec<String>,
    /// Join paths the fragment traverses, one per cross-table comparison.
    pub required_joins: Vec<JoinPath>,
    /// True when some join path can reach many related rows per primary
    /// row. Informational: the EXISTS form already returns each primary row
    /// at most once, so the execution layer does not need DISTINCT.
    pub deduplicate: bool,
}

impl fmt::Display for CompiledQuery {
    /// Renders `WHERE …[ ORDER BY …]`, ready to append after
    /// `SELECT … FROM <table> `.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WHERE {}", self.where_clause)?;
        if let Some(order_by) = &self.order_by {
            write!(f, " ORDER BY {}", order_by)?;
        }
        Ok(())
    }
}

/// Generate SQL for a parsed query against `primary_table`.
pub fn generate(
    node: &CqlNode,
    primary_table: &str,
    registry: &SchemaRegistry,
) -> Result<CompiledQuery, SqlGenError> {
    let primary = registry
        .table(primary_table)
        .ok_or_else(|| SqlGenError::UnknownPrimaryTable(primary_table.to_string()))?;

    let mut generator = Generator {
        registry,
        primary,
        parameters: Vec::new(),
        required_joins: Vec::new(),
        deduplicate: false,
    };

    let (expr, sort_keys) = match node {
        CqlNode::Sort { child, keys } => (child.as_ref(), Some(keys.as_slice())),
        other => (other, None),
    };

    let mut where_clause = String::new();
    generator.emit(expr, &mut where_clause)?;
    let order_by = sort_keys.map(|keys| generator.order_by(keys)).transpose()?;

    Ok(CompiledQuery {
        where_clause,
        order_by,
        parameters: generator.parameters,
        required_joins: generator.required_joins,
        deduplicate: generator.deduplicate,
    })
}

struct Generator<'a> {
    registry: &'a SchemaRegistry,
    primary: &'a TableInfo,
    parameters: Vec<String>,
    required_joins: Vec<JoinPath>,
    deduplicate: bool,
}

impl Generator<'_> {
    fn emit(&mut self, node: &CqlNode, out: &mut String) -> Result<(), SqlGenError> {
        match node {
            CqlNode::Comparison(cmp) => {
                let sql = self.comparison(cmp)?;
                out.push_str(&sql);
                Ok(())
            }
            CqlNode::Boolean {
                op: BooleanOp::Not,
                children,
            } => {
                out.push_str("NOT (");
                // The parser only builds NOT with exactly one child.
                for child in children {
                    self.emit(child, out)?;
                }
                out.push(')');
                Ok(())
            }
            CqlNode::Boolean { op, children } => {
                out.push('(');
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                        out.push_str(op.as_sql());
                        out.push(' ');
                    }
                    self.emit(child, out)?;
                }
                out.push(')');
                Ok(())
            }
            CqlNode::Sort { .. } => Err(UnsupportedOperatorError::new(
                "sortby",
                "sortby is only valid at the top level of a query",
            )
            .into()),
        }
    }

    fn comparison(&mut self, cmp: &Comparison) -> Result<String, SqlGenError> {
        let path = resolver::resolve(&cmp.field, &self.primary.name, self.registry)?;
        if !path.is_local() {
            if path.cardinality() == Cardinality::Many {
                self.deduplicate = true;
            }
            self.required_joins.push(path.clone());
        }
        let primary_name = self.primary.name.clone();
        self.scope(&primary_name, &primary_name, &path.edges, 1, cmp)
    }

    /// Render the predicate for `cmp`, wrapped in one `EXISTS` subquery per
    /// remaining join edge. Joined tables get depth-suffixed aliases so
    /// self-referential chains never collide with an outer scope.
    fn scope(
        &mut self,
        table: &str,
        alias: &str,
        edges: &[ForeignKeyEdge],
        depth: usize,
        cmp: &Comparison,
    ) -> Result<String, SqlGenError> {
        match edges.split_first() {
            None => {
                let info = self.table_info(table, cmp)?;
                let expr = format!("{}.{}", alias, info.document_field(&cmp.field.name));
                self.predicate(cmp, &expr)
            }
            Some((edge, rest)) => {
                let inner_alias = format!("{}_{}", edge.target_table, depth);
                let join = format!(
                    "{}.{} = {}.{}",
                    alias, edge.source_join_column, inner_alias, edge.target_join_column
                );
                let inner = self.scope(&edge.target_table, &inner_alias, rest, depth + 1, cmp)?;
                Ok(format!(
                    "EXISTS (SELECT 1 FROM {} {} WHERE {} AND {})",
                    edge.target_table, inner_alias, join, inner
                ))
            }
        }
    }

    fn table_info(&self, table: &str, cmp: &Comparison) -> Result<&TableInfo, SqlGenError> {
        // Edge targets were validated at registry load, so this lookup only
        // fails for a hand-built AST naming a table the schema lacks.
        self.registry.table(table).ok_or_else(|| {
            SqlGenError::UnknownField(UnknownFieldError {
                field: cmp.field.to_string(),
                primary_table: self.primary.name.clone(),
            })
        })
    }

    /// The leaf predicate over a JSON text-extraction expression.
    fn predicate(&mut self, cmp: &Comparison, expr: &str) -> Result<String, SqlGenError> {
        let op = cmp.op;
        let value = &cmp.value;

        if value.is_match_all() {
            return match op {
                ComparisonOp::Exact | ComparisonOp::Substring => {
                    Ok(format!("{} IS NOT NULL", expr))
                }
                _ => Err(UnsupportedOperatorError::new(
                    op.symbol(),
                    "a match-all value `*` requires `=` or `==`",
                )
                .into()),
            };
        }

        if value.has_wildcard() {
            return match op {
                ComparisonOp::Exact => {
                    let placeholder = self.bind(pattern::like_pattern(value));
                    Ok(format!("{} LIKE {}", expr, placeholder))
                }
                ComparisonOp::Substring => {
                    let placeholder = self.bind(format!("%{}%", pattern::like_pattern(value)));
                    Ok(format!("lower({}) LIKE lower({})", expr, placeholder))
                }
                _ => Err(UnsupportedOperatorError::new(
                    op.symbol(),
                    "wildcards cannot be combined with a relational operator",
                )
                .into()),
            };
        }

        let literal = value.literal_text();
        match op {
            ComparisonOp::Exact => {
                let placeholder = self.bind(literal);
                Ok(format!("{} = {}", expr, placeholder))
            }
            ComparisonOp::Substring => {
                let placeholder = self.bind(pattern::contains_pattern(value));
                Ok(format!("lower({}) LIKE lower({})", expr, placeholder))
            }
            ComparisonOp::NotEqual => {
                let placeholder = self.bind(literal);
                Ok(format!("{} <> {}", expr, placeholder))
            }
            ComparisonOp::Less
            | ComparisonOp::LessOrEqual
            | ComparisonOp::Greater
            | ComparisonOp::GreaterOrEqual => {
                // Numeric literals compare numerically, everything else as
                // text.
                let numeric = literal.parse::<f64>().is_ok();
                let placeholder = self.bind(literal);
                if numeric {
                    Ok(format!(
                        "({})::numeric {} ({})::numeric",
                        expr,
                        op.symbol(),
                        placeholder
                    ))
                } else {
                    Ok(format!("{} {} {}", expr, op.symbol(), placeholder))
                }
            }
        }
    }

    fn order_by(&mut self, keys: &[SortKey]) -> Result<String, SqlGenError> {
        let mut items = Vec::with_capacity(keys.len());
        for key in keys {
            let path = resolver::resolve(&key.field, &self.primary.name, self.registry)?;
            if !path.is_local() {
                return Err(UnsupportedOperatorError::new(
                    "sortby",
                    format!(
                        "sort key `{}` must live in the primary table's document",
                        key.field
                    ),
                )
                .into());
            }
            items.push(format!(
                "{}.{} {}",
                self.primary.name,
                self.primary.document_field(&key.field.name),
                if key.descending { "DESC" } else { "ASC" }
            ));
        }
        Ok(items.join(", "))
    }

    /// Append a bound parameter, returning its `$n` placeholder. Generation
    /// walks the tree left to right, so placeholder numbering is globally
    /// contiguous.
    fn bind(&mut self, value: String) -> String {
        self.parameters.push(value);
        format!("${}", self.parameters.len())
    }
}
