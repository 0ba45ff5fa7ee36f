//! Zero Code API: REST endpoints and an OpenAPI document synthesized from a MySQL schema.

pub mod auth;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod introspect;
pub mod openapi;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;

pub use auth::{AccessPolicy, AuthorizationGate, Decision};
pub use config::{DatabaseClient, SecuritySettings, Settings};
pub use endpoints::{EndpointSynthesizer, RegistrationReport, RegistrationState, RouteRegistry};
pub use error::{AppError, ConfigError};
pub use introspect::{SchemaCache, SchemaIntrospector, SchemaSnapshot};
pub use routes::{api_routes, common_routes};
pub use service::CrudService;
pub use state::AppState;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Largest accepted request body.
pub const BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

/// Health routes at the top level, every synthesized route under `API_ROOT`.
pub fn app(state: AppState) -> Router {
    let api_root = state.settings.api_root.clone();
    Router::new()
        .merge(common_routes(state.clone()))
        .nest(&api_root, api_routes(state))
        .layer(
            ServiceBuilder::new()
                .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(CompressionLayer::new()),
        )
}
