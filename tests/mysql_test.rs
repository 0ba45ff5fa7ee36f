//! End-to-end run against a real MySQL schema. Skipped unless
//! `ZERO_CODE_TEST_DATABASE_URL` points at a database the test may create tables in.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::mysql::MySqlPoolOptions;
use tower::ServiceExt;
use zero_code_api::{app, AppState, Settings};

fn database_url() -> Option<String> {
    let url = std::env::var("ZERO_CODE_TEST_DATABASE_URL").ok();
    if url.is_none() {
        eprintln!("ZERO_CODE_TEST_DATABASE_URL not set, skipping");
    }
    url
}

async fn app_for(url: &str, extra: &[(&str, &str)]) -> Router {
    let settings = Settings::from_lookup(|key| {
        if key == "DATABASE_URL" {
            return Some(url.to_string());
        }
        extra.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
    })
    .unwrap();
    let pool = MySqlPoolOptions::new().max_connections(2).connect(url).await.unwrap();
    let state = AppState::new(pool, settings);
    state.synthesizer.register_all().await.unwrap();
    app(state)
}

fn unique(prefix: &str) -> String {
    format!("{}{}", prefix, &uuid::Uuid::new_v4().simple().to_string()[..8])
}

async fn call(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let body = if body.is_null() { String::new() } else { body.to_string() };
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn crud_round_on_a_created_table() {
    let Some(url) = database_url() else { return };
    let app = app_for(&url, &[]).await;

    let table = unique("zc_test_");
    let (status, body) = call(&app, "GET", &format!("/api/table/{}", table), Value::Null).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{}", body);
    assert_eq!(body["code"], 404001);
    assert!(body.get("content").is_none());

    let spec = json!({
        "tableName": table,
        "columns": {
            "name": {"type": "VARCHAR", "length": 45, "isNotNullable": true},
            "email": {"type": "VARCHAR", "length": 45},
        }
    });
    let (status, body) = call(&app, "POST", "/api/zero-code/table", spec.clone()).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert!(body["content"].as_str().unwrap().starts_with("CREATE TABLE IF NOT EXISTS"));
    let (status, body) = call(&app, "POST", "/api/zero-code/table", spec).await;
    assert_eq!(status, StatusCode::CONFLICT, "{}", body);

    // Not reachable until a refresh registers it.
    let (status, _) = call(&app, "GET", &format!("/api/{}", table), Value::Null).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = call(&app, "POST", "/api/zero-code/refresh", Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Endpoints refreshed");

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/{}", table),
        json!({"inserts": [{"name": "ann", "email": "ann@example.com"}]}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["code"], 200001);
    let id = body["content"][0].as_u64().unwrap();

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/{}", table),
        json!({"inserts": [{"name": "bob"}, {"name": "cy", "email": "cy@example.com"}]}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.get("content").is_none());

    let (status, body) = call(&app, "GET", &format!("/api/{}?itemsPerPage=2&pageIndex=0", table), Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["content"]["totalItems"], 3);
    assert_eq!(body["content"]["totalPages"], 2);

    let (status, body) = call(&app, "GET", &format!("/api/{}/{}", table, id), Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["name"], "ann");

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/{}/query", table),
        json!({
            "filters": [{"column": "email", "operation": "null", "negate": "true"}],
            "fields": ["name"],
            "pagination": {"pagination": false},
            "sort": {"column": "name", "direction": "desc"}
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["code"], 200001);
    assert_eq!(body["content"], json!([{"name": "cy"}, {"name": "ann"}]));

    let (status, body) = call(&app, "PUT", &format!("/api/{}/{}", table, id), json!({"email": "a@example.com"})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["content"], 1);

    let (status, body) = call(&app, "DELETE", &format!("/api/{}/999999", table), Value::Null).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body["code"], 500001);
    let (status, _) = call(&app, "DELETE", &format!("/api/{}/{}", table, id), Value::Null).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(&app, "GET", &format!("/api/table/{}", table), Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Table selected");
    assert_eq!(body["content"]["columns"].as_array().unwrap().len(), 3);

    let (status, _) = call(&app, "POST", "/api/zero-code/raw-query", json!({"dbQuery": format!("DROP TABLE {}", table)})).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn hidden_prefix_keeps_system_tables_out_of_the_listing() {
    let Some(url) = database_url() else { return };
    let app = app_for(&url, &[("HIDE_SYSTEM_TABLES", "true")]).await;
    let system = unique("OAUTH2_zc_");
    let plain = unique("zc_plain_");
    for table in [&system, &plain] {
        let ddl = format!("CREATE TABLE {} (id INT PRIMARY KEY)", table);
        let (status, body) = call(&app, "POST", "/api/zero-code/raw-query", json!({"dbQuery": ddl})).await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
    }

    let (status, body) = call(&app, "GET", "/api/table", Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["content"].as_array().unwrap().iter().filter_map(|t| t["name"].as_str()).collect();
    assert!(names.contains(&plain.as_str()), "{:?}", names);
    assert!(!names.iter().any(|n| n.eq_ignore_ascii_case(&system)), "{:?}", names);

    for table in [&system, &plain] {
        call(&app, "POST", "/api/zero-code/raw-query", json!({"dbQuery": format!("DROP TABLE {}", table)})).await;
    }
}

#[tokio::test]
async fn year_and_long_time_columns_keep_their_values() {
    let Some(url) = database_url() else { return };
    let app = app_for(&url, &[]).await;
    let table = unique("zc_times_");
    let statements = [
        format!("CREATE TABLE {} (id INT PRIMARY KEY, made YEAR, span TIME)", table),
        format!("INSERT INTO {} VALUES (1, 2024, '-838:59:59'), (2, NULL, '26:00:00')", table),
    ];
    for ddl in statements {
        let (status, body) = call(&app, "POST", "/api/zero-code/raw-query", json!({"dbQuery": ddl})).await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
    }

    let select = format!("SELECT made, span FROM {} ORDER BY id", table);
    let (status, body) = call(&app, "POST", "/api/zero-code/raw-query", json!({"dbQuery": select})).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(
        body["content"],
        json!([{"made": 2024, "span": "-838:59:59"}, {"made": null, "span": "26:00:00"}])
    );

    call(&app, "POST", "/api/zero-code/raw-query", json!({"dbQuery": format!("DROP TABLE {}", table)})).await;
}
