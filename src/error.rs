//! The error surface of the crate.
//!
//! Each stage keeps its own error type; this enum is the union callers see
//! from [`QueryCompiler::to_sql`](crate::compiler::QueryCompiler::to_sql).
//! The variants are distinguishable on purpose: an HTTP layer typically maps
//! `Syntax`, `UnknownField` and `UnsupportedOperator` to a client error and
//! `Schema` to a server error.

use thiserror::Error;

use crate::cql_parser::QuerySyntaxError;
use crate::resolver::UnknownFieldError;
use crate::schema_catalog::SchemaConfigError;
use crate::sql_generator::{SqlGenError, UnsupportedOperatorError};

#[derive(Debug, Error)]
pub enum CompileError {
    /// The query text is not well-formed CQL.
    #[error(transparent)]
    Syntax(#[from] QuerySyntaxError),

    /// A field's qualifier names a table unreachable from the primary table.
    #[error(transparent)]
    UnknownField(#[from] UnknownFieldError),

    /// The schema descriptor itself is unusable.
    #[error(transparent)]
    Schema(#[from] SchemaConfigError),

    /// A well-formed construct with no safe SQL translation.
    #[error(transparent)]
    UnsupportedOperator(#[from] UnsupportedOperatorError),
}

impl From<SqlGenError> for CompileError {
    fn from(err: SqlGenError) -> Self {
        match err {
            SqlGenError::UnknownField(e) => CompileError::UnknownField(e),
            SqlGenError::UnsupportedOperator(e) => CompileError::UnsupportedOperator(e),
            SqlGenError::UnknownPrimaryTable(table) => {
                CompileError::Schema(SchemaConfigError::UnknownTable(table))
            }
        }
    }
}
