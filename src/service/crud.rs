//! Generic statement execution against MySQL, rows decoded to JSON.

use crate::error::AppError;
use crate::sql::{bind_params, QueryBuf};
use serde_json::{Map, Value};
use sqlx::mysql::types::MySqlTime;
use sqlx::mysql::MySqlRow;
use sqlx::{Column, MySqlPool, Row, TypeInfo};

pub struct CrudService;

impl CrudService {
    pub async fn fetch_all(pool: &MySqlPool, q: &QueryBuf) -> Result<Vec<Value>, sqlx::Error> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_params(sqlx::query(&q.sql), &q.params).fetch_all(pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    pub async fn fetch_optional(pool: &MySqlPool, q: &QueryBuf) -> Result<Option<Value>, sqlx::Error> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_params(sqlx::query(&q.sql), &q.params).fetch_optional(pool).await?;
        Ok(row.as_ref().map(row_to_json))
    }

    /// Runs a `SELECT COUNT(*) AS total ...`.
    pub async fn count(pool: &MySqlPool, q: &QueryBuf) -> Result<u64, sqlx::Error> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_params(sqlx::query(&q.sql), &q.params).fetch_one(pool).await?;
        let total: i64 = row.try_get("total")?;
        Ok(total.max(0) as u64)
    }

    /// Returns the id generated for the first inserted row.
    pub async fn insert(pool: &MySqlPool, q: &QueryBuf) -> Result<u64, sqlx::Error> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let result = bind_params(sqlx::query(&q.sql), &q.params).execute(pool).await?;
        Ok(result.last_insert_id())
    }

    /// UPDATE or DELETE; returns affected rows.
    pub async fn execute(pool: &MySqlPool, q: &QueryBuf) -> Result<u64, sqlx::Error> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let result = bind_params(sqlx::query(&q.sql), &q.params).execute(pool).await?;
        Ok(result.rows_affected())
    }

    /// Unprepared passthrough. Rows of every result set are returned in order.
    pub async fn raw(pool: &MySqlPool, sql: &str) -> Result<Vec<Value>, sqlx::Error> {
        tracing::debug!(sql = %sql, "raw query");
        let rows = sqlx::raw_sql(sql).fetch_all(pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    /// Run a `CREATE TABLE IF NOT EXISTS`; a warning on the same connection means the
    /// table was already there.
    pub async fn execute_ddl(pool: &MySqlPool, sql: &str, table: &str) -> Result<(), AppError> {
        tracing::debug!(sql = %sql, "ddl");
        let on_error = |source| AppError::QueryExecution {
            on_function: "create_table",
            code: 500008,
            source,
        };
        let mut conn = pool.acquire().await.map_err(on_error)?;
        sqlx::Executor::execute(&mut *conn, sql).await.map_err(on_error)?;
        // A bare &str runs over the text protocol, so no prepare resets the diagnostics area first.
        let row = sqlx::Executor::fetch_one(&mut *conn, "SELECT CAST(@@warning_count AS SIGNED) AS warnings")
            .await
            .map_err(on_error)?;
        let warnings: i64 = row.try_get("warnings").map_err(on_error)?;
        if warnings > 0 {
            return Err(AppError::TableAlreadyExists(table.to_string()));
        }
        Ok(())
    }
}

pub fn row_to_json(row: &MySqlRow) -> Value {
    let mut map = Map::new();
    for (i, col) in row.columns().iter().enumerate() {
        map.insert(col.name().to_string(), cell_to_value(row, i));
    }
    Value::Object(map)
}

fn cell_to_value(row: &MySqlRow, i: usize) -> Value {
    match row.columns()[i].type_info().name() {
        "JSON" => {
            if let Ok(Some(v)) = row.try_get::<Option<Value>, _>(i) {
                return v;
            }
        }
        "YEAR" => {
            if let Ok(v) = row.try_get::<Option<u16>, _>(i) {
                return v.map(Value::from).unwrap_or(Value::Null);
            }
        }
        // TIME spans -838:59:59..838:59:59, wider than a time of day.
        "TIME" => {
            if let Ok(v) = row.try_get::<Option<MySqlTime>, _>(i) {
                return v.map(|t| Value::String(format_time(&t))).unwrap_or(Value::Null);
            }
        }
        _ => {}
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(i) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<u64>, _>(i) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(i) {
        return v.and_then(serde_json::Number::from_f64).map(Value::Number).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f32>, _>(i) {
        return v
            .and_then(|n| serde_json::Number::from_f64(n as f64))
            .map(Value::Number)
            .unwrap_or(Value::Null);
    }
    // Decimals keep their exact text.
    if let Ok(v) = row.try_get::<Option<rust_decimal::Decimal>, _>(i) {
        return v.map(|d| Value::String(d.to_string())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(i) {
        return v.map(|d| Value::String(d.to_rfc3339())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDateTime>, _>(i) {
        return v
            .map(|d| Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveDate>, _>(i) {
        return v.map(|d| Value::String(d.format("%Y-%m-%d").to_string())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<chrono::NaiveTime>, _>(i) {
        return v.map(|t| Value::String(t.format("%H:%M:%S%.f").to_string())).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(i) {
        return v.map(Value::String).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(i) {
        return v
            .map(|b| Value::String(String::from_utf8_lossy(&b).into_owned()))
            .unwrap_or(Value::Null);
    }
    Value::Null
}

fn format_time(t: &MySqlTime) -> String {
    let sign = if t.sign().is_negative() { "-" } else { "" };
    let mut out = format!("{}{:02}:{:02}:{:02}", sign, t.hours(), t.minutes(), t.seconds());
    if t.microseconds() > 0 {
        out.push_str(&format!(".{:06}", t.microseconds()));
    }
    out
}
