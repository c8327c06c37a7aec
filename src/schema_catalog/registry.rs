//! Validated, immutable index over the schema descriptor.
//!
//! The registry is built once, before any query is compiled, and is then
//! read-only: it can be shared behind an `Arc` by any number of concurrent
//! compilers. Every declared foreign key is materialized as two directed
//! edges (forward plus its reverse), so the resolver can walk relationships
//! in either direction without inferring anything structurally.

use std::collections::{BTreeMap, HashMap};

use super::descriptor::SchemaDescriptor;
use super::errors::SchemaConfigError;

/// Which side of the declared foreign key this edge walks.
///
/// `Forward` goes from the table owning the reference field to the table it
/// points at (many-to-one); `Reverse` goes from the referenced table back to
/// its dependents (one-to-many).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

/// How many rows of the target table one source row can reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    AtMostOne,
    Many,
}

impl Cardinality {
    /// Chaining edges multiplies their cardinalities.
    pub fn combine(self, other: Cardinality) -> Cardinality {
        match (self, other) {
            (Cardinality::AtMostOne, Cardinality::AtMostOne) => Cardinality::AtMostOne,
            _ => Cardinality::Many,
        }
    }
}

/// One directed relationship step between two tables.
///
/// The join column expressions are prebuilt at load time, relative to their
/// table (no alias prefix): for a forward edge from `tableb` to `tablea`
/// they are `jsonb->>'tableaId'` and `id::text`. Table and column names come
/// from the trusted descriptor, never from query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyEdge {
    pub source_table: String,
    pub target_table: String,
    /// JSON key on the reference-owning table's document.
    pub field: String,
    pub direction: Direction,
    pub cardinality: Cardinality,
    pub source_join_column: String,
    pub target_join_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub name: String,
    pub document_column: String,
    pub primary_key: String,
}

impl TableInfo {
    /// JSON text-extraction expression for a document field, without alias
    /// prefix: `jsonb->>'name'`.
    pub fn document_field(&self, field: &str) -> String {
        format!("{}->>'{}'", self.document_column, field)
    }

    /// Primary key rendered as text, for comparison against document fields.
    pub fn primary_key_text(&self) -> String {
        format!("{}::text", self.primary_key)
    }
}

#[derive(Debug)]
pub struct SchemaRegistry {
    tables: BTreeMap<String, TableInfo>,
    /// Outgoing edges per source table, declaration order preserved
    /// (forward edges first, then derived reverse edges).
    outgoing: BTreeMap<String, Vec<ForeignKeyEdge>>,
    /// Forward edges indexed by (source table, reference field).
    forward_by_field: HashMap<(String, String), ForeignKeyEdge>,
}

impl SchemaRegistry {
    pub fn load(descriptor: &SchemaDescriptor) -> Result<Self, SchemaConfigError> {
        let mut tables = BTreeMap::new();
        for (name, table) in &descriptor.tables {
            if table.document_column.is_empty() {
                return Err(SchemaConfigError::EmptyColumn {
                    table: name.clone(),
                    what: "document column",
                });
            }
            if table.primary_key.is_empty() {
                return Err(SchemaConfigError::EmptyColumn {
                    table: name.clone(),
                    what: "primary key",
                });
            }
            tables.insert(
                name.clone(),
                TableInfo {
                    name: name.clone(),
                    document_column: table.document_column.clone(),
                    primary_key: table.primary_key.clone(),
                },
            );
        }

        let mut outgoing: BTreeMap<String, Vec<ForeignKeyEdge>> = BTreeMap::new();
        let mut forward_by_field = HashMap::new();
        for (name, table) in &descriptor.tables {
            for fk in &table.foreign_keys {
                let target = tables.get(&fk.target_table).ok_or_else(|| {
                    SchemaConfigError::UnknownTargetTable {
                        table: name.clone(),
                        field: fk.field.clone(),
                        target: fk.target_table.clone(),
                    }
                })?;
                let source = &tables[name];
                let key = (name.clone(), fk.field.clone());
                if forward_by_field.contains_key(&key) {
                    return Err(SchemaConfigError::DuplicateForeignKey {
                        table: name.clone(),
                        field: fk.field.clone(),
                    });
                }

                let forward = ForeignKeyEdge {
                    source_table: name.clone(),
                    target_table: fk.target_table.clone(),
                    field: fk.field.clone(),
                    direction: Direction::Forward,
                    cardinality: Cardinality::AtMostOne,
                    source_join_column: source.document_field(&fk.field),
                    target_join_column: target.primary_key_text(),
                };
                let reverse = ForeignKeyEdge {
                    source_table: fk.target_table.clone(),
                    target_table: name.clone(),
                    field: fk.field.clone(),
                    direction: Direction::Reverse,
                    cardinality: Cardinality::Many,
                    source_join_column: target.primary_key_text(),
                    target_join_column: source.document_field(&fk.field),
                };
                forward_by_field.insert(key, forward.clone());
                outgoing.entry(name.clone()).or_default().push(forward);
                outgoing
                    .entry(fk.target_table.clone())
                    .or_default()
                    .push(reverse);
            }
        }

        log::info!(
            "schema registry loaded: {} tables, {} foreign keys",
            tables.len(),
            forward_by_field.len()
        );
        Ok(SchemaRegistry {
            tables,
            outgoing,
            forward_by_field,
        })
    }

    pub fn table(&self, name: &str) -> Option<&TableInfo> {
        self.tables.get(name)
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn edges_from(&self, table: &str) -> &[ForeignKeyEdge] {
        self.outgoing.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Look up the declared foreign key for a reference field on `table`.
    pub fn resolve_edge(&self, table: &str, field: &str) -> Option<&ForeignKeyEdge> {
        self.forward_by_field
            .get(&(table.to_string(), field.to_string()))
    }
}
