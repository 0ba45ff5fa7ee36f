//! Fixed route shapes mounted under the API root. Each request is resolved against the
//! route registry, so only tables registered by the synthesizer are reachable.

use crate::error::AppError;
use crate::extractors::RequestContext;
use crate::handlers::{dispatch, docs, Invocation};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::Method,
    response::Response,
    routing::{get, post},
    Router,
};

async fn list_tables(State(state): State<AppState>, method: Method, ctx: RequestContext) -> Result<Response, AppError> {
    let invocation = Invocation { ctx, ..Default::default() };
    dispatch(&state, method, "/table", invocation).await
}

async fn get_table(
    State(state): State<AppState>,
    Path(table_name): Path<String>,
    method: Method,
    ctx: RequestContext,
) -> Result<Response, AppError> {
    let invocation = Invocation {
        ctx,
        param: Some(table_name),
        ..Default::default()
    };
    dispatch(&state, method, "/table/:tableName", invocation).await
}

/// `/zero-code/*` actions, all POST.
async fn admin_action(
    State(state): State<AppState>,
    Path(action): Path<String>,
    method: Method,
    ctx: RequestContext,
    body: Bytes,
) -> Result<Response, AppError> {
    let invocation = Invocation { ctx, param: None, body };
    dispatch(&state, method, &format!("/zero-code/{}", action), invocation).await
}

async fn collection(
    State(state): State<AppState>,
    Path(table): Path<String>,
    method: Method,
    ctx: RequestContext,
    body: Bytes,
) -> Result<Response, AppError> {
    let invocation = Invocation { ctx, param: None, body };
    dispatch(&state, method, &format!("/{}", table), invocation).await
}

async fn query(
    State(state): State<AppState>,
    Path(table): Path<String>,
    method: Method,
    ctx: RequestContext,
    body: Bytes,
) -> Result<Response, AppError> {
    let invocation = Invocation { ctx, param: None, body };
    dispatch(&state, method, &format!("/{}/query", table), invocation).await
}

async fn item(
    State(state): State<AppState>,
    Path((table, id)): Path<(String, String)>,
    method: Method,
    ctx: RequestContext,
    body: Bytes,
) -> Result<Response, AppError> {
    let invocation = Invocation {
        ctx,
        param: Some(id),
        body,
    };
    dispatch(&state, method, &format!("/{}/:id", table), invocation).await
}

/// Routes relative to the API root; the caller nests them.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/docs", get(docs::swagger_ui))
        .route("/docs/openapi.json", get(docs::openapi_json))
        .route("/table", get(list_tables))
        .route("/table/:table_name", get(get_table))
        .route("/zero-code/:action", post(admin_action))
        .route("/:table", get(collection).post(collection))
        .route("/:table/query", post(query))
        .route("/:table/:id", get(item).put(item).delete(item))
        .with_state(state)
}
