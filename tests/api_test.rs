//! Router-level tests over a lazily connected pool: every request here is answered
//! before a database connection is needed.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::mysql::MySqlPoolOptions;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use zero_code_api::config::{DatabaseClient, DocsSettings, SecuritySettings, Settings};
use zero_code_api::extractors::RequestContext;
use zero_code_api::introspect::{ColumnKey, ColumnMetadata, SchemaSnapshot, TableMetadata};
use zero_code_api::{app, AccessPolicy, AppError, AppState, AuthorizationGate, Decision};

fn settings() -> Settings {
    Settings {
        port: 0,
        database_url: "mysql://nobody@127.0.0.1:1/shop".into(),
        database_client: DatabaseClient::MySql,
        database_name: "shop".into(),
        max_connections: 1,
        hide_system_tables: false,
        system_table_prefix: "OAUTH2_".into(),
        api_root: "/api".into(),
        docs: DocsSettings::default(),
        security: SecuritySettings::Disabled,
        table_settings: HashMap::new(),
    }
}

fn column(name: &str, data_type: &str, nullable: bool, key: ColumnKey) -> ColumnMetadata {
    ColumnMetadata {
        name: name.into(),
        default_value: None,
        nullable,
        data_type: data_type.into(),
        column_type: data_type.into(),
        extra: String::new(),
        comment: String::new(),
        key,
        referenced_schema: None,
        referenced_table: None,
        referenced_column: None,
    }
}

/// `users(id PK, name NOT NULL, email NULL)`.
fn users_snapshot() -> SchemaSnapshot {
    SchemaSnapshot {
        tables: vec![TableMetadata {
            name: "users".into(),
            comment: Some("Registered users".into()),
            schema: "shop".into(),
        }],
        columns_by_table: HashMap::from([(
            "users".to_string(),
            vec![
                column("id", "int", false, ColumnKey::Primary),
                column("name", "varchar", false, ColumnKey::None),
                column("email", "varchar", true, ColumnKey::None),
            ],
        )]),
    }
}

fn state_with(settings: Settings, gate: AuthorizationGate) -> AppState {
    let pool = MySqlPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy(&settings.database_url)
        .unwrap();
    let state = AppState::with_gate(pool, settings, gate);
    state.synthesizer.register_snapshot(users_snapshot());
    state
}

fn open_app() -> Router {
    app(state_with(settings(), AuthorizationGate::from_settings(&SecuritySettings::Disabled)))
}

struct DenyAll;

#[async_trait]
impl AccessPolicy for DenyAll {
    async fn authorize(&self, _permission: &str, _ctx: &RequestContext) -> Result<Decision, AppError> {
        Ok(Decision::Deny)
    }
}

async fn send(app: Router, method: &str, uri: &str, body: &str) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("host", "example.com:2000")
        .body(Body::from(body.to_string()))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_is_ok() {
    let (status, body) = send(open_app(), "GET", "/health", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"Ok");
}

#[tokio::test]
async fn unregistered_table_is_not_found() {
    let (status, body) = send_json(open_app(), "GET", "/api/ghosts", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404001);
    assert!(body["errorUUID"].is_string());
}

#[tokio::test]
async fn denied_request_is_unauthorized() {
    let app = app(state_with(settings(), AuthorizationGate::new(Arc::new(DenyAll))));
    let (status, body) = send_json(app, "DELETE", "/api/users/1", "").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Client not authorized");
    assert_eq!(body["code"], 400801);
}

#[tokio::test]
async fn bearer_mode_without_token_never_calls_the_service() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/validate").expect(0).create_async().await;
    let security = SecuritySettings::Bearer {
        endpoint: format!("{}/validate", server.url()),
        app_identifier: "zero-code".into(),
    };
    let app = app(state_with(settings(), AuthorizationGate::from_settings(&security)));
    let (status, body) = send_json(app, "GET", "/api/users", "").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 400801);
    mock.assert_async().await;
}

#[tokio::test]
async fn malformed_bodies_are_validation_errors() {
    let cases = [
        ("POST", "/api/users", "{\"inserts\": ["),
        ("POST", "/api/users", "{\"inserts\": []}"),
        ("PUT", "/api/users/1", "{}"),
        ("POST", "/api/users/query", "{\"filters\": 3}"),
        (
            "POST",
            "/api/users/query",
            "{\"filters\": [{\"column\": \"id\", \"operation\": \"between\", \"value\": 3}]}",
        ),
    ];
    for (method, uri, body) in cases {
        let (status, json) = send_json(open_app(), method, uri, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {} {}", method, uri, body);
        assert_eq!(json["code"], 400001);
    }
}

#[tokio::test]
async fn raw_query_requires_db_query() {
    let (status, body) = send_json(open_app(), "POST", "/api/zero-code/raw-query", "{}").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid body, dbQuery is required");
}

#[tokio::test]
async fn table_creation_is_validated_before_execution() {
    let body = json!({"tableName": "bad name", "columns": {"title": {"type": "VARCHAR", "length": 20}}});
    let (status, json) = send_json(open_app(), "POST", "/api/zero-code/table", &body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], 400001);
}

#[tokio::test]
async fn unknown_admin_action_is_not_found() {
    let (status, _) = send_json(open_app(), "POST", "/api/zero-code/drop-everything", "{}").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn docs_describe_registered_tables() {
    let (status, doc) = send_json(open_app(), "GET", "/api/docs/openapi.json", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["info"]["title"], "Zero Code REST API for shop");
    assert_eq!(doc["servers"][0]["url"], "http://example.com:2000/api");
    assert!(doc["paths"]["/users/{id}"]["put"].is_object());
    assert_eq!(doc["components"]["schemas"]["users"]["required"], json!(["id", "name"]));

    let (status, page) = send(open_app(), "GET", "/api/docs", "").await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(page).unwrap().contains("/api/docs/openapi.json"));
}

#[tokio::test]
async fn docs_refuse_unsupported_engines() {
    let mut settings = settings();
    settings.database_client = DatabaseClient::Other("oracledb".into());
    let app = app(state_with(settings, AuthorizationGate::from_settings(&SecuritySettings::Disabled)));
    let (status, body) = send_json(app, "GET", "/api/docs/openapi.json", "").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], 500201);
}

#[tokio::test]
async fn database_failures_use_handler_codes() {
    let (status, body) = send_json(open_app(), "GET", "/api/users?itemsPerPage=10", "").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], 500001);
    assert!(body["message"].as_str().unwrap().starts_with("Data base error. "));
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let body = format!("{{\"dbQuery\": \"{}\"}}", "x".repeat(zero_code_api::BODY_LIMIT_BYTES));
    let req = Request::builder()
        .method("POST")
        .uri("/api/zero-code/raw-query")
        .header("content-type", "application/json")
        .header("content-length", body.len())
        .body(Body::from(body))
        .unwrap();
    let res = open_app().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/api/users")
        .header("origin", "http://client.example")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();
    let res = open_app().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("access-control-allow-origin"));
}
