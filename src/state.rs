//! Shared application state for all routes.

use crate::auth::AuthorizationGate;
use crate::config::Settings;
use crate::endpoints::{EndpointSynthesizer, RouteRegistry};
use crate::introspect::{SchemaCache, SchemaIntrospector};
use sqlx::MySqlPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: MySqlPool,
    pub settings: Arc<Settings>,
    pub registry: Arc<RouteRegistry>,
    /// Snapshot of the latest completed registration pass.
    pub cache: Arc<SchemaCache>,
    pub introspector: SchemaIntrospector,
    pub synthesizer: Arc<EndpointSynthesizer>,
    pub gate: AuthorizationGate,
}

impl AppState {
    /// Wires every component from `settings`. No route is registered yet.
    pub fn new(pool: MySqlPool, settings: Settings) -> Self {
        let gate = AuthorizationGate::from_settings(&settings.security);
        Self::with_gate(pool, settings, gate)
    }

    pub fn with_gate(pool: MySqlPool, settings: Settings, gate: AuthorizationGate) -> Self {
        let registry = Arc::new(RouteRegistry::new());
        let cache = Arc::new(SchemaCache::new());
        let introspector = SchemaIntrospector::new(
            pool.clone(),
            settings.database_name.clone(),
            settings.hidden_table_prefix().map(str::to_string),
        );
        let synthesizer = Arc::new(EndpointSynthesizer::new(
            introspector.clone(),
            settings.database_client.clone(),
            registry.clone(),
            cache.clone(),
        ));
        AppState {
            pool,
            settings: Arc::new(settings),
            registry,
            cache,
            introspector,
            synthesizer,
            gate,
        }
    }
}
