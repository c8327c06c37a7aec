use thiserror::Error;

/// Errors detected while loading or indexing the schema descriptor. All of
/// them surface at load time, before any query is compiled.
#[derive(Debug, Error)]
pub enum SchemaConfigError {
    #[error("failed to read schema descriptor `{path}`: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schema descriptor: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("foreign key `{field}` on table `{table}` references unknown table `{target}`")]
    UnknownTargetTable {
        table: String,
        field: String,
        target: String,
    },

    #[error("table `{table}` declares foreign key field `{field}` more than once")]
    DuplicateForeignKey { table: String, field: String },

    #[error("table `{table}` has an empty {what}")]
    EmptyColumn { table: String, what: &'static str },

    #[error("unknown table `{0}`")]
    UnknownTable(String),
}
