//! docql - Contextual Query Language compiler for JSONB document tables
//!
//! This crate translates CQL search expressions into parameterized SQL
//! predicates through:
//! - CQL parsing into a boolean/comparison AST
//! - Schema-driven resolution of cross-table field references
//! - Correlated-EXISTS generation for foreign-key traversal
//! - Injection-safe, placeholder-only SQL fragments

pub mod compiler;
pub mod cql_parser;
pub mod error;
pub mod executor;
pub mod resolver;
pub mod schema_catalog;
pub mod sql_generator;

pub use compiler::QueryCompiler;
pub use error::CompileError;
pub use schema_catalog::{SchemaDescriptor, SchemaRegistry};
pub use sql_generator::CompiledQuery;
