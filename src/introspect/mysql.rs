//! MySQL catalog reader over `information_schema`.
//!
//! Every text column is cast to CHAR so MySQL 8 binary-collated catalog columns decode
//! as `String`.

use crate::error::AppError;
use crate::introspect::types::*;
use sqlx::MySqlPool;

#[derive(sqlx::FromRow)]
struct TableRow {
    table_name: String,
    table_comment: Option<String>,
    table_schema: String,
}

impl From<TableRow> for TableMetadata {
    fn from(row: TableRow) -> Self {
        TableMetadata {
            name: row.table_name,
            comment: row.table_comment.filter(|c| !c.is_empty()),
            schema: row.table_schema,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ColumnRow {
    column_name: String,
    column_default: Option<String>,
    is_nullable: String,
    data_type: String,
    column_type: String,
    extra: Option<String>,
    column_comment: Option<String>,
    column_key: Option<String>,
}

impl From<ColumnRow> for ColumnMetadata {
    fn from(row: ColumnRow) -> Self {
        ColumnMetadata {
            name: row.column_name,
            default_value: row.column_default,
            nullable: row.is_nullable.eq_ignore_ascii_case("YES"),
            data_type: row.data_type,
            column_type: row.column_type,
            extra: row.extra.unwrap_or_default(),
            comment: row.column_comment.unwrap_or_default(),
            key: ColumnKey::parse(row.column_key.as_deref().unwrap_or_default()),
            referenced_schema: None,
            referenced_table: None,
            referenced_column: None,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RelationRow {
    column_name: String,
    referenced_table_schema: String,
    referenced_table_name: String,
    referenced_column_name: String,
}

const TABLES_SQL: &str = "SELECT CAST(table_name AS CHAR) AS table_name, \
CAST(table_comment AS CHAR) AS table_comment, CAST(table_schema AS CHAR) AS table_schema \
FROM information_schema.tables WHERE table_schema = ?";

const COLUMNS_SQL: &str = "SELECT CAST(column_name AS CHAR) AS column_name, \
CAST(column_default AS CHAR) AS column_default, CAST(is_nullable AS CHAR) AS is_nullable, \
CAST(data_type AS CHAR) AS data_type, CAST(column_type AS CHAR) AS column_type, \
CAST(extra AS CHAR) AS extra, CAST(column_comment AS CHAR) AS column_comment, \
CAST(column_key AS CHAR) AS column_key \
FROM information_schema.columns WHERE table_schema = ? AND table_name = ? \
ORDER BY ordinal_position";

const RELATIONS_SQL: &str = "SELECT CAST(column_name AS CHAR) AS column_name, \
CAST(referenced_table_schema AS CHAR) AS referenced_table_schema, \
CAST(referenced_table_name AS CHAR) AS referenced_table_name, \
CAST(referenced_column_name AS CHAR) AS referenced_column_name \
FROM information_schema.key_column_usage \
WHERE table_schema = ? AND table_name = ? AND referenced_table_name IS NOT NULL";

/// Reads tables and columns of one schema.
#[derive(Clone)]
pub struct SchemaIntrospector {
    pool: MySqlPool,
    schema: String,
    hidden_prefix: Option<String>,
}

impl SchemaIntrospector {
    pub fn new(pool: MySqlPool, schema: impl Into<String>, hidden_prefix: Option<String>) -> Self {
        SchemaIntrospector {
            pool,
            schema: schema.into(),
            hidden_prefix,
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub async fn list_tables(&self) -> Result<Vec<TableMetadata>, AppError> {
        let mut sql = String::from(TABLES_SQL);
        if self.hidden_prefix.is_some() {
            sql.push_str(" AND SUBSTRING(table_name, 1, CHAR_LENGTH(?)) <> ?");
        }
        sql.push_str(" ORDER BY table_name");
        tracing::debug!(sql = %sql, params = ?[&self.schema], "query");

        let mut query = sqlx::query_as::<_, TableRow>(&sql).bind(&self.schema);
        if let Some(prefix) = &self.hidden_prefix {
            query = query.bind(prefix).bind(prefix);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::introspection("list_tables"))?;
        Ok(rows.into_iter().map(TableMetadata::from).collect())
    }

    /// Missing tables are `NotFound`, never an empty record.
    pub async fn get_table(&self, name: &str) -> Result<TableMetadata, AppError> {
        let sql = format!("{} AND table_name = ?", TABLES_SQL);
        tracing::debug!(sql = %sql, params = ?[self.schema.as_str(), name], "query");
        let row = sqlx::query_as::<_, TableRow>(&sql)
            .bind(&self.schema)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::introspection("get_table"))?;
        row.map(TableMetadata::from)
            .ok_or_else(|| AppError::NotFound(format!("table {}", name)))
    }

    /// Column metadata in declaration order with foreign-key targets merged in.
    pub async fn get_columns(&self, table: &str) -> Result<Vec<ColumnMetadata>, AppError> {
        tracing::debug!(sql = %COLUMNS_SQL, params = ?[self.schema.as_str(), table], "query");
        let columns = sqlx::query_as::<_, ColumnRow>(COLUMNS_SQL)
            .bind(&self.schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::introspection("get_columns"))?;

        tracing::debug!(sql = %RELATIONS_SQL, params = ?[self.schema.as_str(), table], "query");
        let relations = sqlx::query_as::<_, RelationRow>(RELATIONS_SQL)
            .bind(&self.schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::introspection("get_columns"))?;

        Ok(merge_relations(
            columns.into_iter().map(ColumnMetadata::from).collect(),
            relations
                .into_iter()
                .map(|r| ForeignKeyRelation {
                    column: r.column_name,
                    referenced_schema: r.referenced_table_schema,
                    referenced_table: r.referenced_table_name,
                    referenced_column: r.referenced_column_name,
                })
                .collect(),
        ))
    }

    pub async fn get_full_table(&self, name: &str) -> Result<FullTable, AppError> {
        let table = self.get_table(name).await?;
        let columns = self.get_columns(&table.name).await?;
        Ok(FullTable { table, columns })
    }

    /// One full pass. Any failure fails the pass; no partial snapshot is returned.
    pub async fn snapshot(&self) -> Result<SchemaSnapshot, AppError> {
        let tables = self.list_tables().await?;
        let mut snapshot = SchemaSnapshot::default();
        for table in &tables {
            let columns = self.get_columns(&table.name).await?;
            snapshot.columns_by_table.insert(table.name.clone(), columns);
        }
        snapshot.tables = tables;
        Ok(snapshot)
    }
}
