//! Builds parameterized SELECT, INSERT, UPDATE, DELETE for MySQL.
//!
//! Identifiers arrive from requests (table, columns, sort keys) and are always
//! backtick-quoted; values are always `?` parameters.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Quote identifier for MySQL.
pub fn quoted(s: &str) -> String {
    format!("`{}`", s.replace('`', "``"))
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> &'static str {
        self.params.push(v);
        "?"
    }
}

/// How a condition joins the predicate built so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connector {
    #[default]
    And,
    Or,
}

impl Connector {
    fn as_sql(self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Gt,
    Eq,
    Le,
    Ge,
    Ne,
    Like,
}

impl CompareOp {
    fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Eq => "=",
            CompareOp::Le => "<=",
            CompareOp::Ge => ">=",
            CompareOp::Ne => "<>",
            CompareOp::Like => "LIKE",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    Compare { column: String, op: CompareOp, value: Value },
    In { column: String, values: Vec<Value> },
    Between { column: String, low: Value, high: Value },
    Null { column: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    pub connector: Connector,
    pub negate: bool,
    pub predicate: Predicate,
}

impl Condition {
    pub fn and(predicate: Predicate) -> Self {
        Condition {
            connector: Connector::And,
            negate: false,
            predicate,
        }
    }

    fn render(&self, q: &mut QueryBuf) -> String {
        match &self.predicate {
            Predicate::Compare { column, op, value } => {
                let p = q.push_param(value.clone());
                let expr = format!("{} {} {}", quoted(column), op.as_sql(), p);
                if self.negate {
                    format!("NOT ({})", expr)
                } else {
                    expr
                }
            }
            Predicate::In { values, .. } if values.is_empty() => {
                // Nothing is a member of the empty set.
                if self.negate { "1 = 1".into() } else { "1 = 0".into() }
            }
            Predicate::In { column, values } => {
                let marks: Vec<&str> = values.iter().map(|v| q.push_param(v.clone())).collect();
                let not = if self.negate { "NOT " } else { "" };
                format!("{} {}IN ({})", quoted(column), not, marks.join(", "))
            }
            Predicate::Between { column, low, high } => {
                let low = q.push_param(low.clone());
                let high = q.push_param(high.clone());
                let not = if self.negate { "NOT " } else { "" };
                format!("{} {}BETWEEN {} AND {}", quoted(column), not, low, high)
            }
            Predicate::Null { column } => {
                let not = if self.negate { "NOT " } else { "" };
                format!("{} IS {}NULL", quoted(column), not)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Anything but `desc` (any case) sorts ascending.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A single-table SELECT whose conditions chain flat and left to right, as written.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectQuery {
    pub table: String,
    /// Empty selects every column.
    pub columns: Vec<String>,
    pub conditions: Vec<Condition>,
    pub order_by: Option<(String, SortDirection)>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl SelectQuery {
    pub fn new(table: impl Into<String>) -> Self {
        SelectQuery {
            table: table.into(),
            ..Default::default()
        }
    }

    pub fn columns(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }

    pub fn push(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn where_eq(self, column: impl Into<String>, value: Value) -> Self {
        self.push(Condition::and(Predicate::Compare {
            column: column.into(),
            op: CompareOp::Eq,
            value,
        }))
    }

    pub fn order_by(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some((column.into(), direction));
        self
    }

    pub fn limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: Option<u64>) -> Self {
        self.offset = offset;
        self
    }

    fn push_where(&self, q: &mut QueryBuf) {
        for (i, condition) in self.conditions.iter().enumerate() {
            let expr = condition.render(q);
            if i == 0 {
                q.sql.push_str(" WHERE ");
            } else {
                q.sql.push(' ');
                q.sql.push_str(condition.connector.as_sql());
                q.sql.push(' ');
            }
            q.sql.push_str(&expr);
        }
    }

    pub fn to_select(&self) -> QueryBuf {
        let mut q = QueryBuf::new();
        let cols = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.iter().map(|c| quoted(c)).collect::<Vec<_>>().join(", ")
        };
        q.sql = format!("SELECT {} FROM {}", cols, quoted(&self.table));
        self.push_where(&mut q);
        if let Some((column, direction)) = &self.order_by {
            q.sql.push_str(&format!(" ORDER BY {} {}", quoted(column), direction.as_sql()));
        }
        if let Some(limit) = self.limit {
            q.sql.push_str(&format!(" LIMIT {}", limit));
            if let Some(offset) = self.offset {
                q.sql.push_str(&format!(" OFFSET {}", offset));
            }
        }
        q
    }

    /// Same predicate, no projection, ordering or window.
    pub fn to_count(&self) -> QueryBuf {
        let mut q = QueryBuf::new();
        q.sql = format!("SELECT COUNT(*) AS total FROM {}", quoted(&self.table));
        self.push_where(&mut q);
        q
    }
}

/// Multi-row INSERT over the union of the rows' keys; a row missing a key gets `DEFAULT`.
pub fn insert(table: &str, rows: &[Map<String, Value>]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let columns: IndexSet<&str> = rows.iter().flat_map(|r| r.keys().map(String::as_str)).collect();
    let col_list = columns.iter().map(|c| quoted(c)).collect::<Vec<_>>().join(", ");
    let mut tuples = Vec::with_capacity(rows.len());
    for row in rows {
        let values: Vec<&str> = columns
            .iter()
            .map(|c| match row.get(*c) {
                Some(v) => q.push_param(v.clone()),
                None => "DEFAULT",
            })
            .collect();
        tuples.push(format!("({})", values.join(", ")));
    }
    q.sql = format!("INSERT INTO {} ({}) VALUES {}", quoted(table), col_list, tuples.join(", "));
    q
}

/// UPDATE ... SET each key of `body` WHERE `column` = id.
pub fn update(table: &str, body: &Map<String, Value>, column: &str, id: &Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let sets: Vec<String> = body
        .iter()
        .map(|(k, v)| format!("{} = {}", quoted(k), q.push_param(v.clone())))
        .collect();
    let p = q.push_param(id.clone());
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {}",
        quoted(table),
        sets.join(", "),
        quoted(column),
        p
    );
    q
}

pub fn delete(table: &str, column: &str, id: &Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let p = q.push_param(id.clone());
    q.sql = format!("DELETE FROM {} WHERE {} = {}", quoted(table), quoted(column), p);
    q
}
