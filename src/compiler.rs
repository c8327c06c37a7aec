//! The compilation façade: one [`QueryCompiler`] per primary table.
//!
//! A compiler holds an `Arc` to the shared schema registry, so constructing
//! one is cheap and many can run concurrently against the same schema.
//! Compilation is pure: no I/O, no database connection, identical input
//! always yields the identical [`CompiledQuery`].

use std::sync::Arc;

use crate::cql_parser;
use crate::error::CompileError;
use crate::schema_catalog::{SchemaConfigError, SchemaRegistry, TableInfo};
use crate::sql_generator::{self, CompiledQuery};

#[derive(Debug)]
pub struct QueryCompiler {
    primary: TableInfo,
    registry: Arc<SchemaRegistry>,
}

impl QueryCompiler {
    /// Create a compiler targeting `primary_table`. Fails up front if the
    /// schema does not declare that table, so `to_sql` never has to report a
    /// configuration problem as a query problem.
    pub fn new(
        registry: Arc<SchemaRegistry>,
        primary_table: &str,
    ) -> Result<Self, SchemaConfigError> {
        let primary = registry
            .table(primary_table)
            .ok_or_else(|| SchemaConfigError::UnknownTable(primary_table.to_string()))?
            .clone();
        Ok(QueryCompiler { primary, registry })
    }

    pub fn primary_table(&self) -> &str {
        &self.primary.name
    }

    /// Compile a CQL query into a parameterized WHERE-clause fragment.
    pub fn to_sql(&self, query: &str) -> Result<CompiledQuery, CompileError> {
        let ast = cql_parser::parse(query)?;
        let compiled = sql_generator::generate(&ast, &self.primary.name, &self.registry)?;
        log::debug!(
            "compiled `{}` against `{}`: {} parameter(s), {} join(s)",
            query,
            self.primary.name,
            compiled.parameters.len(),
            compiled.required_joins.len()
        );
        Ok(compiled)
    }
}
