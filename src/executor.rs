//! Execution seam between compiled queries and a database driver.
//!
//! The crate itself never touches a connection; callers implement
//! [`QueryExecutor`] over their driver of choice and feed it the fragment and
//! parameters from a [`CompiledQuery`](crate::sql_generator::CompiledQuery).

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde_json::Value;

/// Result rows as JSON documents, streamed rather than collected.
pub type RowStream<'a> = BoxStream<'a, anyhow::Result<Value>>;

/// A database backend capable of running a parameterized statement.
///
/// Implementations must bind `parameters` positionally to the `$n`
/// placeholders in `sql` and must release any held connection or cursor when
/// the returned stream is dropped, even if the caller stops polling early.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute<'a>(
        &'a self,
        sql: &str,
        parameters: &[String],
    ) -> anyhow::Result<RowStream<'a>>;
}
