//! Schema discovery and administrative handlers.

use super::Invocation;
use crate::endpoints::EndpointHandler;
use crate::error::AppError;
use crate::response::{envelope, message_only, CODE_OK, CODE_WRITTEN};
use crate::service::{visible_columns, CrudService, RequestValidator};
use crate::sql::{generate_create_statement, TableCreationSpec};
use crate::state::AppState;
use axum::{http::StatusCode, response::Response};
use serde_json::Value;

/// `GET /table`
pub async fn list_tables(state: &AppState) -> Result<Response, AppError> {
    let tables = state.introspector.list_tables().await?;
    Ok(envelope(StatusCode::OK, CODE_OK, "Tables selected", Some(tables)))
}

/// `GET /table/:tableName`: columns limited by the projection allow-list.
pub async fn get_table(state: &AppState, invocation: &Invocation) -> Result<Response, AppError> {
    let name = invocation.param();
    let mut full = state.introspector.get_full_table(name).await?;
    full.columns = visible_columns(&full.table.name, &state.settings.table_settings, full.columns);
    Ok(envelope(StatusCode::OK, CODE_OK, "Table selected", Some(full)))
}

/// `POST /zero-code/refresh`
pub async fn refresh(state: &AppState) -> Result<Response, AppError> {
    let report = state.synthesizer.refresh().await?;
    tracing::info!(tables = report.tables, added = report.added, "refresh requested");
    Ok(message_only(StatusCode::OK, CODE_OK, "Endpoints refreshed"))
}

/// `POST /zero-code/raw-query` with `{dbQuery}`, executed verbatim.
pub async fn raw_query(state: &AppState, invocation: &Invocation) -> Result<Response, AppError> {
    let body = invocation.json()?;
    let sql = body
        .get("dbQuery")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Invalid body, dbQuery is required".into()))?;
    let rows = CrudService::raw(&state.pool, sql)
        .await
        .map_err(|e| EndpointHandler::RawQuery.db_error(e))?;
    Ok(envelope(StatusCode::CREATED, CODE_OK, "Raw query executed", Some(rows)))
}

/// `POST /zero-code/table`: validate, compile to DDL, execute. Content is the statement.
pub async fn create_table(state: &AppState, invocation: &Invocation) -> Result<Response, AppError> {
    let spec: TableCreationSpec = invocation.parse()?;
    RequestValidator::table_creation(&spec)?;
    let statement = generate_create_statement(&spec);
    CrudService::execute_ddl(&state.pool, &statement, &spec.table_name).await?;
    tracing::info!(table = %spec.table_name, "table created");
    Ok(envelope(StatusCode::CREATED, CODE_WRITTEN, "Table created", Some(statement)))
}
