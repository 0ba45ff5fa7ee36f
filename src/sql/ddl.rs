//! `CREATE TABLE` statements from a JSON column description.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_PRIMARY_KEY_NAME: &str = "id";

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnReference {
    pub table: String,
    pub column: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnCreationSpec {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default, alias = "lenght")]
    pub length: Option<u32>,
    #[serde(default, alias = "isNotNulleable")]
    pub is_not_nullable: bool,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default)]
    pub is_unsigned: bool,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub reference: Option<ColumnReference>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCreationSpec {
    pub table_name: String,
    #[serde(default)]
    pub primary_key_name: Option<String>,
    /// Declaration order is kept.
    #[serde(default)]
    pub columns: IndexMap<String, ColumnCreationSpec>,
}

impl TableCreationSpec {
    pub fn primary_key(&self) -> &str {
        self.primary_key_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_PRIMARY_KEY_NAME)
    }
}

fn sql_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Numeric defaults (numbers or strings that parse as one) are emitted bare.
fn default_clause(value: &Value) -> String {
    let literal = match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.trim().parse::<f64>().is_ok_and(f64::is_finite) => s.trim().to_string(),
        Value::String(s) => sql_string(s),
        other => sql_string(&other.to_string()),
    };
    format!(" DEFAULT {}", literal)
}

/// Identifiers are emitted bare; callers validate them first.
pub fn generate_create_statement(spec: &TableCreationSpec) -> String {
    let table = &spec.table_name;
    let pk = spec.primary_key();
    let mut statement = format!(
        "CREATE TABLE IF NOT EXISTS {}(\n{} INT UNSIGNED NOT NULL AUTO_INCREMENT",
        table, pk
    );
    let mut constraints = String::new();

    for (name, column) in &spec.columns {
        statement.push_str(&format!(",\n{} {}", name, column.type_));
        if let Some(length) = column.length.filter(|l| *l > 0) {
            statement.push_str(&format!("({})", length));
        }
        if column.is_unsigned {
            statement.push_str(" UNSIGNED");
        }
        statement.push_str(if column.is_not_nullable { " NOT NULL" } else { " NULL" });
        if let Some(default) = &column.default_value {
            statement.push_str(&default_clause(default));
        }
        if let Some(comment) = column.comment.as_deref().filter(|c| !c.is_empty()) {
            statement.push_str(&format!(" COMMENT {}", sql_string(comment)));
        }

        if column.is_unique {
            constraints.push_str(&format!(",\nCONSTRAINT UC_{}_{} UNIQUE ({})", table, name, name));
        }
        if let Some(reference) = &column.reference {
            constraints.push_str(&format!(
                ",\nCONSTRAINT FK_{}_{} FOREIGN KEY ({})\nREFERENCES {}({})",
                reference.table, table, name, reference.table, reference.column
            ));
        }
    }

    statement.push_str(&format!(",\nCONSTRAINT PK_{} PRIMARY KEY ({})", table, pk));
    statement.push_str(&constraints);
    statement.push_str("\n);");
    statement
}
