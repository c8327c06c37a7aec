//! On-disk schema descriptor.
//!
//! The descriptor is a JSON document naming, per table, the JSONB document
//! column, the primary-key column and the foreign-key fields stored inside
//! the document. A declaration
//! `{"field": "tableaId", "targetTable": "tablea"}` on `tableb` means each
//! `tableb` document may carry the primary key of one `tablea` row under the
//! `tableaId` key (a many-to-one reference).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::errors::SchemaConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SchemaDescriptor {
    pub tables: BTreeMap<String, TableDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TableDescriptor {
    #[serde(default = "default_document_column")]
    pub document_column: String,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ForeignKeyDescriptor {
    /// JSON key inside the document column that stores the referenced
    /// primary key.
    pub field: String,
    pub target_table: String,
}

fn default_document_column() -> String {
    "jsonb".to_string()
}

fn default_primary_key() -> String {
    "id".to_string()
}

impl SchemaDescriptor {
    pub fn from_json_str(json: &str) -> Result<Self, SchemaConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaConfigError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|source| SchemaConfigError::Read {
                path: path.as_ref().display().to_string(),
                source,
            })?;
        Self::from_json_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_descriptor_with_defaults() {
        let descriptor = SchemaDescriptor::from_json_str(
            r#"{
                "tables": {
                    "tablea": {},
                    "tableb": {
                        "documentColumn": "jsonb",
                        "primaryKey": "id",
                        "foreignKeys": [
                            {"field": "tableaId", "targetTable": "tablea"}
                        ]
                    }
                }
            }"#,
        )
        .unwrap();

        let tablea = &descriptor.tables["tablea"];
        assert_eq!(tablea.document_column, "jsonb");
        assert_eq!(tablea.primary_key, "id");
        assert!(tablea.foreign_keys.is_empty());

        let tableb = &descriptor.tables["tableb"];
        assert_eq!(tableb.foreign_keys.len(), 1);
        assert_eq!(tableb.foreign_keys[0].target_table, "tablea");
    }

    #[test]
    fn rejects_unknown_keys() {
        let result = SchemaDescriptor::from_json_str(
            r#"{"tables": {"t": {"documentColum": "typo"}}}"#,
        );
        assert!(matches!(result, Err(SchemaConfigError::Parse(_))));
    }
}
