//! Request dispatch: resolve the registered endpoint, authorize, run the bound handler.

pub mod admin;
pub mod docs;
pub mod table;

use crate::endpoints::{EndpointDescriptor, EndpointHandler};
use crate::error::AppError;
use crate::extractors::RequestContext;
use crate::state::AppState;
use axum::{body::Bytes, http::Method, response::Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Everything a handler gets from the request.
#[derive(Debug, Default)]
pub struct Invocation {
    pub ctx: RequestContext,
    /// `:id` or `:tableName` segment, when the route has one.
    pub param: Option<String>,
    pub body: Bytes,
}

impl Invocation {
    pub fn param(&self) -> &str {
        self.param.as_deref().unwrap_or_default()
    }

    /// Body as JSON; an empty body reads as `null`.
    pub fn json(&self) -> Result<Value, AppError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&self.body).map_err(|e| AppError::Validation(format!("Invalid body, {}", e)))
    }

    /// Body decoded into `T`; an empty body decodes from `{}`.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        let value = match self.json()? {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        serde_json::from_value(value).map_err(|e| AppError::Validation(format!("Invalid body, {}", e)))
    }
}

/// `pattern` is relative to the API root, e.g. `/users/:id`.
pub async fn dispatch(state: &AppState, method: Method, pattern: &str, invocation: Invocation) -> Result<Response, AppError> {
    let endpoint = state
        .registry
        .resolve(&method, pattern)
        .ok_or_else(|| AppError::NotFound(format!("{} {}", method, pattern)))?;
    state.gate.authorize(&endpoint.permission, &invocation.ctx).await?;
    tracing::debug!(handler = ?endpoint.handler, path = %endpoint.path, "dispatch");
    run(state, &endpoint, &invocation).await
}

async fn run(state: &AppState, endpoint: &EndpointDescriptor, invocation: &Invocation) -> Result<Response, AppError> {
    match endpoint.handler {
        EndpointHandler::List => table::list(state, endpoint, invocation).await,
        EndpointHandler::GetOne => table::get_one(state, endpoint, invocation).await,
        EndpointHandler::Create => table::create(state, endpoint, invocation).await,
        EndpointHandler::Update => table::update(state, endpoint, invocation).await,
        EndpointHandler::Delete => table::delete(state, endpoint, invocation).await,
        EndpointHandler::Query => table::query(state, endpoint, invocation).await,
        EndpointHandler::ListTables => admin::list_tables(state).await,
        EndpointHandler::GetTable => admin::get_table(state, invocation).await,
        EndpointHandler::Refresh => admin::refresh(state).await,
        EndpointHandler::RawQuery => admin::raw_query(state, invocation).await,
        EndpointHandler::CreateTable => admin::create_table(state, invocation).await,
    }
}
