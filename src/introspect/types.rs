//! Catalog metadata as read from `information_schema`.

use serde::Serialize;
use std::collections::HashMap;

/// Fallback primary key for tables whose catalog entry declares none.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMetadata {
    pub name: String,
    pub comment: Option<String>,
    pub schema: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKey {
    Primary,
    Unique,
    Multiple,
    None,
}

impl ColumnKey {
    /// `column_key` values: PRI, UNI, MUL or empty.
    pub fn parse(s: &str) -> Self {
        match s {
            "PRI" => ColumnKey::Primary,
            "UNI" => ColumnKey::Unique,
            "MUL" => ColumnKey::Multiple,
            _ => ColumnKey::None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    pub name: String,
    pub default_value: Option<String>,
    pub nullable: bool,
    pub data_type: String,
    /// Full declared type, e.g. `int unsigned` or `varchar(45)`.
    pub column_type: String,
    pub extra: String,
    pub comment: String,
    pub key: ColumnKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referenced_schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referenced_table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referenced_column: Option<String>,
}

impl ColumnMetadata {
    pub fn is_primary(&self) -> bool {
        self.key == ColumnKey::Primary
    }
}

/// One row of `key_column_usage` with a referenced table.
#[derive(Clone, Debug, PartialEq)]
pub struct ForeignKeyRelation {
    pub column: String,
    pub referenced_schema: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FullTable {
    #[serde(flatten)]
    pub table: TableMetadata,
    pub columns: Vec<ColumnMetadata>,
}

impl FullTable {
    pub fn primary_key(&self) -> &str {
        primary_key_of(&self.columns)
    }
}

/// First primary-key column, or `id`.
pub fn primary_key_of(columns: &[ColumnMetadata]) -> &str {
    columns
        .iter()
        .find(|c| c.is_primary())
        .map(|c| c.name.as_str())
        .unwrap_or(DEFAULT_PRIMARY_KEY)
}

/// Left-merge relation fields into the column with the same name. Relations naming an
/// unknown column are dropped.
pub fn merge_relations(mut columns: Vec<ColumnMetadata>, relations: Vec<ForeignKeyRelation>) -> Vec<ColumnMetadata> {
    for relation in relations {
        if let Some(column) = columns.iter_mut().find(|c| c.name == relation.column) {
            column.referenced_schema = Some(relation.referenced_schema);
            column.referenced_table = Some(relation.referenced_table);
            column.referenced_column = Some(relation.referenced_column);
        }
    }
    columns
}

/// Result of one introspection pass. Registration and document generation both read it.
#[derive(Clone, Debug, Default)]
pub struct SchemaSnapshot {
    pub tables: Vec<TableMetadata>,
    pub columns_by_table: HashMap<String, Vec<ColumnMetadata>>,
}

impl SchemaSnapshot {
    pub fn columns(&self, table: &str) -> &[ColumnMetadata] {
        self.columns_by_table.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.iter().any(|t| t.name == table)
    }

    pub fn primary_key(&self, table: &str) -> &str {
        primary_key_of(self.columns(table))
    }

    pub fn full_table(&self, table: &str) -> Option<FullTable> {
        let meta = self.tables.iter().find(|t| t.name == table)?;
        Some(FullTable {
            table: meta.clone(),
            columns: self.columns(table).to_vec(),
        })
    }
}
