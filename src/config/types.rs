//! Process settings, injected into each component at construction.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::AppError;

/// Per-table projection allow-list: table name -> visible columns.
pub type TableSettings = HashMap<String, Vec<String>>;

/// Database engine named by `DATABASE_CLIENT`. Only MySQL is implemented.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatabaseClient {
    MySql,
    Other(String),
}

impl DatabaseClient {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mysql2" => DatabaseClient::MySql,
            other => DatabaseClient::Other(other.to_string()),
        }
    }

    /// Route and document generation refuse engines they cannot introspect.
    pub fn ensure_supported(&self) -> Result<(), AppError> {
        match self {
            DatabaseClient::MySql => Ok(()),
            DatabaseClient::Other(name) => Err(AppError::UnsupportedBackend(name.clone())),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DocsSettings {
    pub contact_email: String,
    pub contact_name: String,
    pub contact_url: String,
}

/// Which policy backend answers `authorize(permission)`.
#[derive(Clone, Debug)]
pub enum SecuritySettings {
    /// Every request is allowed.
    Disabled,
    /// Bearer token of the caller is checked by a token-introspection endpoint.
    Bearer { endpoint: String, app_identifier: String },
    /// A configurable HTTP call decides.
    Delegated(DelegatedSecurity),
}

/// Delegated policy description, loaded from `SECURITY_CONFIG_PATH`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegatedSecurity {
    pub http_base_url: String,
    pub validate_access: ValidateAccess,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateAccess {
    pub endpoint: String,
    #[serde(default)]
    pub request_conf: RequestTemplate,
    pub response_evaluation_config: ResponseEvaluation,
}

/// Body and header templates. Values starting with `$.` are looked up in the request data.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RequestTemplate {
    #[serde(default)]
    pub body: HashMap<String, Value>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEvaluation {
    pub value_to_evaluate: String,
    pub equal_to: Value,
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub port: u16,
    pub database_url: String,
    pub database_client: DatabaseClient,
    /// Schema whose tables are exposed.
    pub database_name: String,
    pub max_connections: u32,
    pub hide_system_tables: bool,
    pub system_table_prefix: String,
    /// Mount point of every synthesized route, e.g. `/api`.
    pub api_root: String,
    pub docs: DocsSettings,
    pub security: SecuritySettings,
    pub table_settings: TableSettings,
}

impl Settings {
    /// Prefix filtered out of introspection, when hiding is enabled.
    pub fn hidden_table_prefix(&self) -> Option<&str> {
        self.hide_system_tables.then_some(self.system_table_prefix.as_str())
    }
}
