//! Declarative filter clauses and their compilation onto a [`SelectQuery`].

use crate::error::AppError;
use crate::sql::builder::{CompareOp, Condition, Connector, Predicate, SelectQuery};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum Operation {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<>")]
    Ne,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "between")]
    Between,
    #[serde(rename = "like")]
    Like,
    #[serde(rename = "null")]
    Null,
    /// Anything else. Compiles to nothing.
    #[serde(other)]
    Unsupported,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FilterClause {
    pub column: String,
    #[serde(default)]
    pub value: Value,
    pub operation: Operation,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub negate: bool,
    /// Missing means `or`.
    #[serde(default = "or_connector", alias = "operator")]
    pub connector: Connector,
}

fn or_connector() -> Connector {
    Connector::Or
}

/// `true`, `false`, `"true"`, `"false"` or null.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        other => Err(serde::de::Error::custom(format!("negate must be a boolean, got {}", other))),
    }
}

fn like_pattern(value: &Value) -> Value {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    Value::String(format!("%{}%", text))
}

impl FilterClause {
    fn predicate(&self) -> Result<Option<Predicate>, AppError> {
        let column = || self.column.clone();
        let compare = |op: CompareOp, value: Value| Predicate::Compare { column: column(), op, value };
        Ok(Some(match self.operation {
            Operation::Lt => compare(CompareOp::Lt, self.value.clone()),
            Operation::Gt => compare(CompareOp::Gt, self.value.clone()),
            Operation::Eq => compare(CompareOp::Eq, self.value.clone()),
            Operation::Le => compare(CompareOp::Le, self.value.clone()),
            Operation::Ge => compare(CompareOp::Ge, self.value.clone()),
            Operation::Ne => compare(CompareOp::Ne, self.value.clone()),
            Operation::Like => compare(CompareOp::Like, like_pattern(&self.value)),
            Operation::In => Predicate::In {
                column: column(),
                values: match &self.value {
                    Value::Array(items) => items.clone(),
                    other => vec![other.clone()],
                },
            },
            Operation::Between => match self.value.as_array().map(Vec::as_slice) {
                Some([low, high]) => Predicate::Between {
                    column: column(),
                    low: low.clone(),
                    high: high.clone(),
                },
                _ => {
                    return Err(AppError::Validation(format!(
                        "between on '{}' needs a two-element array value",
                        self.column
                    )))
                }
            },
            Operation::Null => Predicate::Null { column: column() },
            Operation::Unsupported => return Ok(None),
        }))
    }
}

/// Apply clauses in order, each AND-ed or OR-ed onto the predicate built so far.
pub fn compile(clauses: &[FilterClause], mut query: SelectQuery) -> Result<SelectQuery, AppError> {
    for clause in clauses {
        match clause.predicate()? {
            Some(predicate) => {
                query = query.push(Condition {
                    connector: clause.connector,
                    negate: clause.negate,
                    predicate,
                })
            }
            None => tracing::debug!(column = %clause.column, "skipping clause with unsupported operation"),
        }
    }
    Ok(query)
}
