//! Turns an introspected schema into registered endpoints.

use super::registry::{EndpointDescriptor, EndpointHandler, RouteRegistry, RESERVED_SEGMENTS};
use crate::config::DatabaseClient;
use crate::error::AppError;
use crate::introspect::{SchemaCache, SchemaIntrospector, SchemaSnapshot};
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationState {
    Unregistered,
    Registering,
    Registered,
}

/// Outcome of one registration pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RegistrationReport {
    pub tables: usize,
    /// Routes that were not registered before this pass.
    pub added: usize,
}

pub struct EndpointSynthesizer {
    introspector: SchemaIntrospector,
    client: DatabaseClient,
    registry: Arc<RouteRegistry>,
    cache: Arc<SchemaCache>,
    state: RwLock<RegistrationState>,
}

impl EndpointSynthesizer {
    pub fn new(
        introspector: SchemaIntrospector,
        client: DatabaseClient,
        registry: Arc<RouteRegistry>,
        cache: Arc<SchemaCache>,
    ) -> Self {
        EndpointSynthesizer {
            introspector,
            client,
            registry,
            cache,
            state: RwLock::new(RegistrationState::Unregistered),
        }
    }

    pub fn state(&self) -> RegistrationState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: RegistrationState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// State to fall back to when a pass is aborted.
    fn settled_state(&self) -> RegistrationState {
        if self.registry.is_empty() {
            RegistrationState::Unregistered
        } else {
            RegistrationState::Registered
        }
    }

    /// Introspect and register. An introspection failure aborts the pass before any
    /// route is added and leaves the cache untouched.
    pub async fn register_all(&self) -> Result<RegistrationReport, AppError> {
        self.client.ensure_supported()?;
        self.set_state(RegistrationState::Registering);
        tracing::info!(schema = %self.introspector.schema(), "registering endpoints");
        let snapshot = match self.introspector.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(schema = %self.introspector.schema(), error = %e, "introspection failed, registration aborted");
                self.set_state(self.settled_state());
                return Err(e);
            }
        };
        Ok(self.register_snapshot(snapshot))
    }

    /// Register the routes of an already introspected schema and publish it to the cache.
    pub fn register_snapshot(&self, mut snapshot: SchemaSnapshot) -> RegistrationReport {
        self.set_state(RegistrationState::Registering);
        snapshot.tables.retain(|table| {
            let reserved = RESERVED_SEGMENTS.contains(&table.name.as_str());
            if reserved {
                tracing::warn!(table = %table.name, "table name collides with a fixed route, not exposed");
            }
            !reserved
        });
        snapshot
            .columns_by_table
            .retain(|name, _| !RESERVED_SEGMENTS.contains(&name.as_str()));
        let mut added = 0;
        for table in &snapshot.tables {
            for handler in EndpointHandler::TABLE_SCOPED {
                if self.registry.register(EndpointDescriptor::for_table(handler, &table.name)) {
                    added += 1;
                }
            }
        }
        for handler in EndpointHandler::ADMIN {
            if self.registry.register(EndpointDescriptor::admin(handler)) {
                added += 1;
            }
        }
        let report = RegistrationReport {
            tables: snapshot.tables.len(),
            added,
        };
        self.cache.replace(snapshot);
        self.set_state(RegistrationState::Registered);
        tracing::info!(tables = report.tables, added = report.added, routes = self.registry.len(), "endpoints registered");
        report
    }

    /// Re-run introspection and registration. Routes of dropped tables stay registered.
    pub async fn refresh(&self) -> Result<RegistrationReport, AppError> {
        tracing::info!("refreshing endpoints");
        self.register_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::types::fixtures::shop;
    use crate::introspect::TableMetadata;
    use axum::http::Method;
    use sqlx::mysql::MySqlPoolOptions;
    use std::time::Duration;

    fn synthesizer(client: DatabaseClient) -> (EndpointSynthesizer, Arc<RouteRegistry>, Arc<SchemaCache>) {
        let pool = MySqlPoolOptions::new()
            .acquire_timeout(Duration::from_millis(300))
            .connect_lazy("mysql://nobody@127.0.0.1:1/shop")
            .unwrap();
        let registry = Arc::new(RouteRegistry::new());
        let cache = Arc::new(SchemaCache::new());
        let synth = EndpointSynthesizer::new(
            SchemaIntrospector::new(pool, "shop", None),
            client,
            registry.clone(),
            cache.clone(),
        );
        (synth, registry, cache)
    }

    #[tokio::test]
    async fn snapshot_registers_every_table() {
        let (synth, registry, cache) = synthesizer(DatabaseClient::MySql);
        assert_eq!(synth.state(), RegistrationState::Unregistered);

        let report = synth.register_snapshot(shop());
        assert_eq!(report, RegistrationReport { tables: 2, added: 6 * 2 + 5 });
        assert_eq!(synth.state(), RegistrationState::Registered);
        assert_eq!(cache.load().tables.len(), 2);

        let d = registry.resolve(&Method::PUT, "/orders/:id").unwrap();
        assert_eq!(d.permission, "orders:update");
        assert!(registry.resolve(&Method::POST, "/zero-code/refresh").is_some());
    }

    #[tokio::test]
    async fn second_pass_is_additive() {
        let (synth, registry, cache) = synthesizer(DatabaseClient::MySql);
        synth.register_snapshot(shop());

        let mut smaller = shop();
        smaller.tables.retain(|t| t.name == "users");
        let report = synth.register_snapshot(smaller);
        assert_eq!(report.added, 0);
        assert!(registry.resolve(&Method::GET, "/orders").is_some());
        assert!(!cache.load().contains("orders"));
    }

    #[tokio::test]
    async fn tables_named_like_fixed_routes_are_skipped() {
        let (synth, registry, cache) = synthesizer(DatabaseClient::MySql);
        let mut snapshot = shop();
        for name in ["table", "zero-code"] {
            snapshot.tables.push(TableMetadata {
                name: name.into(),
                comment: None,
                schema: "shop".into(),
            });
            snapshot.columns_by_table.insert(name.into(), vec![]);
        }
        let report = synth.register_snapshot(snapshot);
        assert_eq!(report.tables, 2);

        let d = registry.resolve(&Method::GET, "/table").unwrap();
        assert_eq!(d.handler, EndpointHandler::ListTables);
        assert_eq!(registry.resolve(&Method::GET, "/table/:tableName").unwrap().handler, EndpointHandler::GetTable);
        assert!(registry.resolve(&Method::POST, "/zero-code").is_none());
        assert!(!cache.load().contains("table"));
    }

    #[tokio::test]
    async fn unsupported_client_is_reported() {
        let (synth, registry, _) = synthesizer(DatabaseClient::Other("postgres".into()));
        let err = synth.register_all().await.unwrap_err();
        assert!(matches!(err, AppError::UnsupportedBackend(ref name) if name == "postgres"));
        assert!(registry.is_empty());
        assert_eq!(synth.state(), RegistrationState::Unregistered);
    }

    #[tokio::test]
    async fn failed_introspection_aborts() {
        let (synth, registry, cache) = synthesizer(DatabaseClient::MySql);
        let err = synth.register_all().await.unwrap_err();
        assert!(matches!(err, AppError::Introspection { .. }));
        assert!(registry.is_empty());
        assert!(cache.load().tables.is_empty());
        assert_eq!(synth.state(), RegistrationState::Unregistered);
    }
}
