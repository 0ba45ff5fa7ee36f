//! Request validation for identifiers and table creation bodies.

use crate::error::AppError;
use crate::sql::TableCreationSpec;
use regex::Regex;

const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_$]{0,63}$";
/// A type keyword, optionally two words (`DOUBLE PRECISION`).
const TYPE_PATTERN: &str = r"^[A-Za-z]+( [A-Za-z]+)?$";

fn matches(pattern: &str, value: &str) -> bool {
    Regex::new(pattern).map(|re| re.is_match(value)).unwrap_or(false)
}

pub struct RequestValidator;

impl RequestValidator {
    pub fn identifier(what: &str, value: &str) -> Result<(), AppError> {
        if matches(IDENTIFIER_PATTERN, value) {
            Ok(())
        } else {
            Err(AppError::Validation(format!("{} '{}' is not a valid identifier", what, value)))
        }
    }

    /// Everything `generate_create_statement` emits bare must pass here first.
    pub fn table_creation(spec: &TableCreationSpec) -> Result<(), AppError> {
        Self::identifier("tableName", &spec.table_name)?;
        let pk = spec.primary_key();
        Self::identifier("primaryKeyName", pk)?;
        for (name, column) in &spec.columns {
            Self::identifier("column", name)?;
            if name.eq_ignore_ascii_case(pk) {
                return Err(AppError::Validation(format!(
                    "column '{}' collides with the generated primary key",
                    name
                )));
            }
            if !matches(TYPE_PATTERN, &column.type_) {
                return Err(AppError::Validation(format!(
                    "column '{}' has invalid type '{}'",
                    name, column.type_
                )));
            }
            if let Some(reference) = &column.reference {
                Self::identifier("reference table", &reference.table)?;
                Self::identifier("reference column", &reference.column)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(v: serde_json::Value) -> TableCreationSpec {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn accepts_plain_spec() {
        let s = spec(json!({
            "tableName": "orders",
            "columns": {
                "user_id": {"type": "INT", "reference": {"table": "users", "column": "id"}},
                "price": {"type": "DOUBLE PRECISION"}
            }
        }));
        assert!(RequestValidator::table_creation(&s).is_ok());
    }

    #[test]
    fn rejects_injection_in_names() {
        let s = spec(json!({"tableName": "t; DROP TABLE users", "columns": {}}));
        assert!(matches!(RequestValidator::table_creation(&s), Err(AppError::Validation(_))));

        let s = spec(json!({"tableName": "t", "columns": {"a": {"type": "INT) ENGINE=x"}}}));
        assert!(RequestValidator::table_creation(&s).is_err());

        let s = spec(json!({
            "tableName": "t",
            "columns": {"a": {"type": "INT", "reference": {"table": "u", "column": "id)"}}}
        }));
        assert!(RequestValidator::table_creation(&s).is_err());
    }

    #[test]
    fn rejects_primary_key_collision() {
        let s = spec(json!({"tableName": "t", "primaryKeyName": "code", "columns": {"CODE": {"type": "INT"}}}));
        let err = RequestValidator::table_creation(&s).unwrap_err();
        assert!(err.to_string().contains("primary key"));
    }
}
