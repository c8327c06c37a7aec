//! Field resolution: decide where a field reference lives.
//!
//! An unqualified field (or one qualified with the primary table itself) is a
//! key inside the primary table's own document and needs no join. Any other
//! qualifier is searched for with a breadth-first walk over the registry's
//! directed edges, so both forward references (the primary row points at the
//! qualifier's table) and reverse references (rows of the qualifier's table
//! point back at the primary) resolve, possibly through several hops.
//!
//! The walk is iterative and bounded: the hop limit equals the number of
//! tables in the schema and no path reuses an edge, so cyclic or
//! self-referential schemas terminate.

use std::collections::VecDeque;

use thiserror::Error;

use crate::cql_parser::ast::FieldRef;
use crate::schema_catalog::{Cardinality, ForeignKeyEdge, SchemaRegistry};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field `{field}` cannot be reached from table `{primary_table}`")]
pub struct UnknownFieldError {
    pub field: String,
    pub primary_table: String,
}

/// The ordered chain of foreign-key edges from the primary table to the
/// table owning the compared value. Empty for local fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinPath {
    pub edges: Vec<ForeignKeyEdge>,
}

impl JoinPath {
    pub fn local() -> Self {
        JoinPath { edges: Vec::new() }
    }

    pub fn is_local(&self) -> bool {
        self.edges.is_empty()
    }

    /// Product of the edge cardinalities.
    pub fn cardinality(&self) -> Cardinality {
        self.edges
            .iter()
            .fold(Cardinality::AtMostOne, |acc, edge| {
                acc.combine(edge.cardinality)
            })
    }
}

/// Resolve `field` against `primary_table`, returning the join path to the
/// table that owns the value.
pub fn resolve(
    field: &FieldRef,
    primary_table: &str,
    registry: &SchemaRegistry,
) -> Result<JoinPath, UnknownFieldError> {
    let qualifier = match &field.qualifier {
        None => return Ok(JoinPath::local()),
        Some(q) if q == primary_table => return Ok(JoinPath::local()),
        Some(q) => q.as_str(),
    };

    let hop_limit = registry.table_count();
    let mut queue: VecDeque<(String, Vec<ForeignKeyEdge>)> = VecDeque::new();
    queue.push_back((primary_table.to_string(), Vec::new()));

    while let Some((table, path)) = queue.pop_front() {
        if path.len() >= hop_limit {
            continue;
        }
        for edge in registry.edges_from(&table) {
            // An edge may appear only once per path; this is what keeps
            // cyclic schemas finite.
            if path.contains(edge) {
                continue;
            }
            let mut extended = path.clone();
            extended.push(edge.clone());
            if edge.target_table == qualifier {
                log::debug!(
                    "resolved `{}` from `{}` via {} hop(s)",
                    field,
                    primary_table,
                    extended.len()
                );
                return Ok(JoinPath { edges: extended });
            }
            queue.push_back((edge.target_table.clone(), extended));
        }
    }

    Err(UnknownFieldError {
        field: field.to_string(),
        primary_table: primary_table.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema_catalog::{Direction, SchemaDescriptor};

    fn registry(json: &str) -> SchemaRegistry {
        SchemaRegistry::load(&SchemaDescriptor::from_json_str(json).unwrap()).unwrap()
    }

    fn fixture() -> SchemaRegistry {
        registry(
            r#"{
                "tables": {
                    "tablea": {},
                    "tableb": {"foreignKeys": [{"field": "tableaId", "targetTable": "tablea"}]},
                    "tablec": {"foreignKeys": [{"field": "tableaId", "targetTable": "tablea"}]},
                    "tabled": {"foreignKeys": [{"field": "tablecId", "targetTable": "tablec"}]}
                }
            }"#,
        )
    }

    #[test]
    fn unqualified_field_is_local() {
        let path = resolve(&FieldRef::local("name"), "tablea", &fixture()).unwrap();
        assert!(path.is_local());
        assert_eq!(path.cardinality(), Cardinality::AtMostOne);
    }

    #[test]
    fn primary_table_qualifier_is_local() {
        let path = resolve(
            &FieldRef::qualified("tablea", "name"),
            "tablea",
            &fixture(),
        )
        .unwrap();
        assert!(path.is_local());
    }

    #[test]
    fn reverse_traversal_from_parent() {
        // tablea is referenced by tableb; searching tablea for a tableb
        // field walks the reverse edge.
        let path = resolve(
            &FieldRef::qualified("tableb", "prefix"),
            "tablea",
            &fixture(),
        )
        .unwrap();
        assert_eq!(path.edges.len(), 1);
        assert_eq!(path.edges[0].direction, Direction::Reverse);
        assert_eq!(path.cardinality(), Cardinality::Many);
    }

    #[test]
    fn forward_traversal_from_child() {
        let path = resolve(
            &FieldRef::qualified("tablea", "name"),
            "tableb",
            &fixture(),
        )
        .unwrap();
        assert_eq!(path.edges.len(), 1);
        assert_eq!(path.edges[0].direction, Direction::Forward);
        assert_eq!(path.cardinality(), Cardinality::AtMostOne);
    }

    #[test]
    fn multi_hop_chains_edges() {
        // tablea -> (reverse) tablec -> (reverse) tabled
        let path = resolve(&FieldRef::qualified("tabled", "x"), "tablea", &fixture()).unwrap();
        assert_eq!(path.edges.len(), 2);
        assert_eq!(path.edges[0].target_table, "tablec");
        assert_eq!(path.edges[1].target_table, "tabled");
        assert_eq!(path.cardinality(), Cardinality::Many);
    }

    #[test]
    fn shortest_path_wins() {
        // tabled can reach tablea through tablec; searching tabled for a
        // tablec field must stop after one hop.
        let path = resolve(&FieldRef::qualified("tablec", "cindex"), "tabled", &fixture()).unwrap();
        assert_eq!(path.edges.len(), 1);
    }

    #[test]
    fn unknown_qualifier_fails() {
        let err = resolve(&FieldRef::qualified("ghost", "x"), "tablea", &fixture()).unwrap_err();
        assert_eq!(err.field, "ghost.x");
        assert_eq!(err.primary_table, "tablea");
    }

    #[test]
    fn self_referential_schema_terminates() {
        let reg = registry(
            r#"{"tables": {"folders": {"foreignKeys": [{"field": "parentId", "targetTable": "folders"}]}}}"#,
        );
        // The qualifier matches through one hop (parent or child folder).
        let path = resolve(&FieldRef::qualified("folders", "x"), "folders", &reg);
        // Qualifier equals the primary table, so it is local.
        assert!(path.unwrap().is_local());
        // And an unknown qualifier exhausts the bounded walk instead of
        // looping.
        let err = resolve(&FieldRef::qualified("ghost", "x"), "folders", &reg);
        assert!(err.is_err());
    }
}
