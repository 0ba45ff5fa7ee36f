//! Route registry: `(method, path pattern)` -> endpoint descriptor.

use crate::error::AppError;
use axum::http::Method;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

/// Permission guarding the schema-discovery and administrative endpoints.
pub const ADMIN_PERMISSION: &str = "*:*";

/// First path segments owned by the admin and docs routes; a table of the same name
/// is never exposed.
pub const RESERVED_SEGMENTS: [&str; 3] = ["table", "zero-code", "docs"];

/// Closed set of handlers a descriptor can be bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndpointHandler {
    List,
    GetOne,
    Create,
    Update,
    Delete,
    Query,
    ListTables,
    GetTable,
    Refresh,
    RawQuery,
    CreateTable,
}

impl EndpointHandler {
    /// Registered once per table, in this order.
    pub const TABLE_SCOPED: [EndpointHandler; 6] = [
        EndpointHandler::List,
        EndpointHandler::GetOne,
        EndpointHandler::Update,
        EndpointHandler::Delete,
        EndpointHandler::Create,
        EndpointHandler::Query,
    ];

    pub const ADMIN: [EndpointHandler; 5] = [
        EndpointHandler::ListTables,
        EndpointHandler::GetTable,
        EndpointHandler::Refresh,
        EndpointHandler::RawQuery,
        EndpointHandler::CreateTable,
    ];

    pub fn is_table_scoped(self) -> bool {
        Self::TABLE_SCOPED.contains(&self)
    }

    pub fn method(self) -> Method {
        match self {
            EndpointHandler::List
            | EndpointHandler::GetOne
            | EndpointHandler::ListTables
            | EndpointHandler::GetTable => Method::GET,
            EndpointHandler::Update => Method::PUT,
            EndpointHandler::Delete => Method::DELETE,
            EndpointHandler::Create
            | EndpointHandler::Query
            | EndpointHandler::Refresh
            | EndpointHandler::RawQuery
            | EndpointHandler::CreateTable => Method::POST,
        }
    }

    /// Path pattern relative to the API root.
    pub fn path(self, table: &str) -> String {
        match self {
            EndpointHandler::List | EndpointHandler::Create => format!("/{}", table),
            EndpointHandler::GetOne | EndpointHandler::Update | EndpointHandler::Delete => {
                format!("/{}/:id", table)
            }
            EndpointHandler::Query => format!("/{}/query", table),
            EndpointHandler::ListTables => "/table".to_string(),
            EndpointHandler::GetTable => "/table/:tableName".to_string(),
            EndpointHandler::Refresh => "/zero-code/refresh".to_string(),
            EndpointHandler::RawQuery => "/zero-code/raw-query".to_string(),
            EndpointHandler::CreateTable => "/zero-code/table".to_string(),
        }
    }

    /// Action half of the permission string.
    pub fn action(self) -> &'static str {
        match self {
            EndpointHandler::List | EndpointHandler::GetOne | EndpointHandler::Query => "select",
            EndpointHandler::Create => "create",
            EndpointHandler::Update => "update",
            EndpointHandler::Delete => "delete",
            _ => "*",
        }
    }

    pub fn permission(self, table: &str) -> String {
        if self.is_table_scoped() {
            format!("{}:{}", table, self.action())
        } else {
            ADMIN_PERMISSION.to_string()
        }
    }

    /// Function name reported with errors raised by this handler.
    pub fn name(self) -> &'static str {
        match self {
            EndpointHandler::List => "get_all",
            EndpointHandler::GetOne => "get_one_by_id",
            EndpointHandler::Create => "create",
            EndpointHandler::Update => "update_one_by_id",
            EndpointHandler::Delete => "delete_one_by_id",
            EndpointHandler::Query => "query",
            EndpointHandler::ListTables => "list_tables",
            EndpointHandler::GetTable => "get_full_table",
            EndpointHandler::Refresh => "refresh",
            EndpointHandler::RawQuery => "raw_query",
            EndpointHandler::CreateTable => "create_table",
        }
    }

    /// Code of a database failure inside this handler.
    pub fn error_code(self) -> u32 {
        match self {
            EndpointHandler::List => 500001,
            EndpointHandler::Create => 500002,
            EndpointHandler::Update => 500003,
            EndpointHandler::GetOne => 500004,
            EndpointHandler::Delete => 500005,
            EndpointHandler::Query => 500006,
            EndpointHandler::RawQuery => 500007,
            EndpointHandler::CreateTable => 500008,
            EndpointHandler::ListTables | EndpointHandler::GetTable | EndpointHandler::Refresh => 500101,
        }
    }

    pub fn db_error(self, source: sqlx::Error) -> AppError {
        AppError::QueryExecution {
            on_function: self.name(),
            code: self.error_code(),
            source,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EndpointDescriptor {
    pub path: String,
    pub method: Method,
    pub permission: String,
    pub handler: EndpointHandler,
    pub table: Option<String>,
}

impl EndpointDescriptor {
    pub fn for_table(handler: EndpointHandler, table: &str) -> Self {
        EndpointDescriptor {
            path: handler.path(table),
            method: handler.method(),
            permission: handler.permission(table),
            handler,
            table: Some(table.to_string()),
        }
    }

    pub fn admin(handler: EndpointHandler) -> Self {
        EndpointDescriptor {
            path: handler.path(""),
            method: handler.method(),
            permission: ADMIN_PERMISSION.to_string(),
            handler,
            table: None,
        }
    }

    /// Table a table-scoped endpoint serves; empty for admin endpoints.
    pub fn table_name(&self) -> &str {
        self.table.as_deref().unwrap_or_default()
    }
}

type RouteKey = (Method, String);

/// Shared, read-mostly map of registered endpoints. Registration only ever adds.
#[derive(Default)]
pub struct RouteRegistry {
    routes: RwLock<HashMap<RouteKey, Arc<EndpointDescriptor>>>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the route was already registered; the existing entry is kept.
    pub fn register(&self, descriptor: EndpointDescriptor) -> bool {
        let mut routes = self.routes.write().unwrap_or_else(PoisonError::into_inner);
        let key = (descriptor.method.clone(), descriptor.path.clone());
        if routes.contains_key(&key) {
            return false;
        }
        tracing::debug!(method = %descriptor.method, path = %descriptor.path, permission = %descriptor.permission, "route registered");
        routes.insert(key, Arc::new(descriptor));
        true
    }

    pub fn resolve(&self, method: &Method, path: &str) -> Option<Arc<EndpointDescriptor>> {
        let routes = self.routes.read().unwrap_or_else(PoisonError::into_inner);
        routes.get(&(method.clone(), path.to_string())).cloned()
    }

    pub fn len(&self) -> usize {
        self.routes.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Descriptors ordered by path, then method.
    pub fn descriptors(&self) -> Vec<Arc<EndpointDescriptor>> {
        let routes = self.routes.read().unwrap_or_else(PoisonError::into_inner);
        let mut all: Vec<_> = routes.values().cloned().collect();
        all.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.method.as_str().cmp(b.method.as_str())));
        all
    }

    /// Tables with at least one registered endpoint, including stale ones.
    pub fn tables(&self) -> BTreeSet<String> {
        let routes = self.routes.read().unwrap_or_else(PoisonError::into_inner);
        routes.values().filter_map(|d| d.table.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_descriptors_carry_permissions() {
        let expected = [
            (Method::GET, "/users", "users:select"),
            (Method::GET, "/users/:id", "users:select"),
            (Method::PUT, "/users/:id", "users:update"),
            (Method::DELETE, "/users/:id", "users:delete"),
            (Method::POST, "/users", "users:create"),
            (Method::POST, "/users/query", "users:select"),
        ];
        for (handler, (method, path, permission)) in EndpointHandler::TABLE_SCOPED.iter().zip(expected) {
            let d = EndpointDescriptor::for_table(*handler, "users");
            assert_eq!(d.method, method);
            assert_eq!(d.path, path);
            assert_eq!(d.permission, permission);
            assert_eq!(d.table_name(), "users");
        }
    }

    #[test]
    fn admin_descriptors_use_wildcard() {
        for handler in EndpointHandler::ADMIN {
            let d = EndpointDescriptor::admin(handler);
            assert_eq!(d.permission, ADMIN_PERMISSION);
            assert!(d.table.is_none());
        }
        assert_eq!(EndpointDescriptor::admin(EndpointHandler::RawQuery).path, "/zero-code/raw-query");
        assert_eq!(EndpointDescriptor::admin(EndpointHandler::GetTable).method, Method::GET);
    }

    #[test]
    fn database_errors_use_handler_codes() {
        let err = EndpointHandler::Delete.db_error(sqlx::Error::RowNotFound);
        assert_eq!(err.code(), 500005);
        assert_eq!(err.on_function(), "delete_one_by_id");
        assert_eq!(EndpointHandler::Query.db_error(sqlx::Error::PoolTimedOut).code(), 500006);
    }

    #[test]
    fn registration_is_additive() {
        let registry = RouteRegistry::new();
        assert!(registry.register(EndpointDescriptor::for_table(EndpointHandler::List, "users")));
        assert!(!registry.register(EndpointDescriptor::for_table(EndpointHandler::List, "users")));
        assert!(registry.register(EndpointDescriptor::for_table(EndpointHandler::Create, "users")));
        assert_eq!(registry.len(), 2);

        let found = registry.resolve(&Method::POST, "/users").unwrap();
        assert_eq!(found.handler, EndpointHandler::Create);
        assert!(registry.resolve(&Method::DELETE, "/users").is_none());
        assert!(registry.resolve(&Method::GET, "/orders").is_none());
        assert_eq!(registry.tables().into_iter().collect::<Vec<_>>(), vec!["users".to_string()]);
    }
}
