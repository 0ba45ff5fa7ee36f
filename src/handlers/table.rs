//! Handlers of the per-table endpoints.

use super::Invocation;
use crate::endpoints::EndpointDescriptor;
use crate::error::AppError;
use crate::introspect::DEFAULT_PRIMARY_KEY;
use crate::response::{envelope, success_created, success_ok, success_unpaginated, CODE_OK};
use crate::service::{columns_to_select, CrudService, PageRequest, QuerySpec};
use crate::sql::{self, compile, SelectQuery, SortDirection};
use crate::state::AppState;
use axum::{http::StatusCode, response::Response};
use serde::Deserialize;
use serde_json::{json, Map, Value};

#[derive(Deserialize)]
struct CreateBody {
    inserts: Vec<Map<String, Value>>,
}

fn identifier_column(invocation: &Invocation) -> &str {
    invocation.ctx.query_param("identifierColumn").unwrap_or(DEFAULT_PRIMARY_KEY)
}

fn id_value(invocation: &Invocation) -> Value {
    Value::String(invocation.param().to_string())
}

/// `GET /T`: always paginated, ordered by `orderByColumn` (default: primary key).
pub async fn list(state: &AppState, endpoint: &EndpointDescriptor, invocation: &Invocation) -> Result<Response, AppError> {
    let table = endpoint.table_name();
    let ctx = &invocation.ctx;
    let page = PageRequest {
        enabled: true,
        ..PageRequest::from_query(&ctx.query)
    };
    let snapshot = state.cache.load();
    let order_by = ctx.query_param("orderByColumn").unwrap_or(snapshot.primary_key(table));
    let direction = ctx.query_param("orderType").map(SortDirection::parse).unwrap_or_default();

    let base = SelectQuery::new(table).columns(columns_to_select(table, &state.settings.table_settings, &[]));
    let total = CrudService::count(&state.pool, &base.to_count())
        .await
        .map_err(|e| endpoint.handler.db_error(e))?;
    let select = page.apply(base.order_by(order_by, direction)).to_select();
    let items = CrudService::fetch_all(&state.pool, &select)
        .await
        .map_err(|e| endpoint.handler.db_error(e))?;
    Ok(success_ok(page.result(items, total)))
}

/// `GET /T/:id`: content is the first matching row, absent when none matches.
pub async fn get_one(state: &AppState, endpoint: &EndpointDescriptor, invocation: &Invocation) -> Result<Response, AppError> {
    let table = endpoint.table_name();
    let q = SelectQuery::new(table)
        .columns(columns_to_select(table, &state.settings.table_settings, &[]))
        .where_eq(identifier_column(invocation), id_value(invocation))
        .limit(Some(1))
        .to_select();
    let row = CrudService::fetch_optional(&state.pool, &q)
        .await
        .map_err(|e| endpoint.handler.db_error(e))?;
    Ok(envelope(StatusCode::OK, CODE_OK, "success", row))
}

/// `POST /T` with `{inserts: [...]}`. The generated id is returned only for a single row.
pub async fn create(state: &AppState, endpoint: &EndpointDescriptor, invocation: &Invocation) -> Result<Response, AppError> {
    let body: CreateBody = invocation.parse()?;
    if body.inserts.is_empty() {
        return Err(AppError::Validation("Invalid body, inserts must hold at least one row".into()));
    }
    if body.inserts.iter().any(Map::is_empty) {
        return Err(AppError::Validation("Invalid body, every insert needs at least one column".into()));
    }
    let q = sql::insert(endpoint.table_name(), &body.inserts);
    let id = CrudService::insert(&state.pool, &q)
        .await
        .map_err(|e| endpoint.handler.db_error(e))?;
    let content = (body.inserts.len() == 1).then(|| json!([id]));
    Ok(success_created(content))
}

/// `PUT /T/:id`: content is the number of affected rows.
pub async fn update(state: &AppState, endpoint: &EndpointDescriptor, invocation: &Invocation) -> Result<Response, AppError> {
    let changes = match invocation.json()? {
        Value::Object(map) if !map.is_empty() => map,
        _ => return Err(AppError::Validation("Invalid body, expected an object with the columns to update".into())),
    };
    let q = sql::update(endpoint.table_name(), &changes, identifier_column(invocation), &id_value(invocation));
    let affected = CrudService::execute(&state.pool, &q)
        .await
        .map_err(|e| endpoint.handler.db_error(e))?;
    Ok(success_created(Some(affected)))
}

/// `DELETE /T/:id`: anything but exactly one deleted row is reported as a failure.
pub async fn delete(state: &AppState, endpoint: &EndpointDescriptor, invocation: &Invocation) -> Result<Response, AppError> {
    let table = endpoint.table_name();
    let q = sql::delete(table, identifier_column(invocation), &id_value(invocation));
    let affected = CrudService::execute(&state.pool, &q)
        .await
        .map_err(|e| endpoint.handler.db_error(e))?;
    if affected != 1 {
        return Err(AppError::DeleteNoRowAffected {
            table: table.to_string(),
            affected,
        });
    }
    Ok(success_created(Some(invocation.param())))
}

/// `POST /T/query`: filters, projection, sort and pagination from the body.
pub async fn query(state: &AppState, endpoint: &EndpointDescriptor, invocation: &Invocation) -> Result<Response, AppError> {
    let table = endpoint.table_name();
    let spec: QuerySpec = invocation.parse()?;
    let page = PageRequest::from_query(&invocation.ctx.query).with_override(spec.pagination.as_ref());

    let columns = columns_to_select(table, &state.settings.table_settings, &spec.fields);
    let mut base = compile(&spec.filters, SelectQuery::new(table).columns(columns))?;
    if let Some(sort) = &spec.sort {
        base = base.order_by(sort.column.as_str(), sort.direction);
    }

    if !page.enabled {
        let items = CrudService::fetch_all(&state.pool, &base.to_select())
            .await
            .map_err(|e| endpoint.handler.db_error(e))?;
        return Ok(success_unpaginated(items));
    }
    let total = CrudService::count(&state.pool, &base.to_count())
        .await
        .map_err(|e| endpoint.handler.db_error(e))?;
    let items = CrudService::fetch_all(&state.pool, &page.apply(base).to_select())
        .await
        .map_err(|e| endpoint.handler.db_error(e))?;
    Ok(success_ok(page.result(items, total)))
}
