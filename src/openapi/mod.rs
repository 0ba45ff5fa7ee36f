//! OpenAPI document synthesized from a schema snapshot.
//!
//! The document must be built from the snapshot the routes were registered from, so the
//! handlers read it from the [`SchemaCache`](crate::introspect::SchemaCache).

pub mod paths;
pub mod schemas;

use crate::config::Settings;
use crate::introspect::SchemaSnapshot;
use serde::Serialize;
use serde_json::{json, Map, Value};

pub const OPENAPI_VERSION: &str = "3.0.2";

#[derive(Clone, Debug, Serialize)]
pub struct Contact {
    pub email: String,
    pub name: String,
    pub url: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ApiInfo {
    pub title: String,
    pub version: String,
    pub description: String,
    pub contact: Contact,
}

impl ApiInfo {
    pub fn from_settings(settings: &Settings) -> Self {
        let db = &settings.database_name;
        ApiInfo {
            title: format!("Zero Code REST API for {}", db),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: format!("REST endpoints for {}, generated from its schema", db),
            contact: Contact {
                email: settings.docs.contact_email.clone(),
                name: settings.docs.contact_name.clone(),
                url: settings.docs.contact_url.clone(),
            },
        }
    }
}

/// One tag per table, described by the table comment.
pub fn create_tags(snapshot: &SchemaSnapshot) -> Value {
    let tags: Vec<Value> = snapshot
        .tables
        .iter()
        .map(|t| match &t.comment {
            Some(comment) if !comment.is_empty() => json!({"name": t.name, "description": comment}),
            _ => json!({"name": t.name}),
        })
        .collect();
    Value::Array(tags)
}

pub fn create_paths(snapshot: &SchemaSnapshot) -> Value {
    let mut out = Map::new();
    for table in &snapshot.tables {
        let name = table.name.as_str();
        out.insert(format!("/{}", name), paths::collection_path(name, snapshot.columns(name)));
        out.insert(format!("/{}/{{id}}", name), paths::item_path(name));
        out.insert(format!("/{}/query", name), paths::query_path(name));
    }
    Value::Object(out)
}

pub fn create_schemas(snapshot: &SchemaSnapshot) -> Value {
    let mut out = Map::new();
    for table in &snapshot.tables {
        let columns = snapshot.columns(&table.name);
        out.insert(table.name.clone(), schemas::table_schema(columns));
        out.insert(format!("{}_query", table.name), schemas::query_schema(columns));
    }
    out.insert("ErrorResponse".into(), schemas::error_schema());
    Value::Object(out)
}

/// Full document. `server_url` is where the paths are mounted, e.g. `http://host/api`.
pub fn generate(info: &ApiInfo, snapshot: &SchemaSnapshot, server_url: &str, openapi_version: &str) -> Value {
    json!({
        "openapi": openapi_version,
        "info": info,
        "servers": [{"url": server_url}],
        "tags": create_tags(snapshot),
        "paths": create_paths(snapshot),
        "components": {
            "schemas": create_schemas(snapshot),
            "securitySchemes": {
                "bearerAuth": {"type": "http", "scheme": "bearer"},
            },
        },
        "security": [{"bearerAuth": []}],
    })
}
