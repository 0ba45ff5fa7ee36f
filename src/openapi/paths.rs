//! Path items for the endpoints registered per table.

use crate::introspect::ColumnMetadata;
use serde_json::{json, Value};

fn schema_ref(name: &str) -> Value {
    json!({"$ref": format!("#/components/schemas/{}", name)})
}

fn security() -> Value {
    json!([{"bearerAuth": []}])
}

/// `{message, code, content}` response with the given content schema.
fn envelope(description: &str, code: u32, content: Value) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": {
                    "type": "object",
                    "properties": {
                        "message": {"type": "string", "example": "success"},
                        "code": {"type": "integer", "example": code},
                        "content": content,
                    },
                },
            },
        },
    })
}

fn error(description: &str) -> Value {
    json!({
        "description": description,
        "content": {"application/json": {"schema": schema_ref("ErrorResponse")}},
    })
}

fn paginated(table: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "items": {"type": "array", "items": schema_ref(table)},
            "pageIndex": {"type": "integer"},
            "itemsPerPage": {"type": "integer"},
            "totalItems": {"type": "integer"},
            "totalPages": {"type": "integer"},
        },
    })
}

fn query_param(name: &str, kind: &str, description: &str) -> Value {
    json!({
        "name": name,
        "in": "query",
        "required": false,
        "schema": {"type": kind},
        "description": description,
    })
}

fn id_params() -> Value {
    json!([
        {
            "name": "id",
            "in": "path",
            "required": true,
            "example": 1,
            "schema": {"type": "string"},
            "description": "Value of the identifier column",
        },
        query_param("identifierColumn", "string", "Column matched against the id, default id"),
    ])
}

fn page_params() -> Vec<Value> {
    vec![
        query_param("itemsPerPage", "integer", "Rows per page, default 20"),
        query_param("pageIndex", "integer", "Page number starting from 0"),
    ]
}

/// `/T` with list and create.
pub fn collection_path(table: &str, columns: &[ColumnMetadata]) -> Value {
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    let mut list_params = vec![
        json!({
            "name": "orderByColumn",
            "in": "query",
            "required": false,
            "schema": {"type": "string", "enum": names},
            "description": "Sort column, default id",
        }),
        json!({
            "name": "orderType",
            "in": "query",
            "required": false,
            "schema": {"type": "string", "enum": ["asc", "desc"]},
            "description": "Sort direction, default asc",
        }),
    ];
    list_params.extend(page_params());
    json!({
        "get": {
            "tags": [table],
            "summary": format!("Get all {} rows", table),
            "security": security(),
            "parameters": list_params,
            "responses": {
                "200": envelope("success", 200000, paginated(table)),
                "401": error("Client not authorized"),
                "500": error("Data base error"),
            },
        },
        "post": {
            "tags": [table],
            "summary": format!("Create new {} rows", table),
            "security": security(),
            "requestBody": {
                "required": true,
                "content": {
                    "application/json": {
                        "schema": {
                            "type": "object",
                            "required": ["inserts"],
                            "properties": {
                                "inserts": {"type": "array", "items": schema_ref(table)},
                            },
                        },
                    },
                },
            },
            "responses": {
                "201": envelope(
                    "success, with the id of the new row when a single row is inserted",
                    200001,
                    json!({"type": "array", "items": {"type": "integer"}, "example": [1]}),
                ),
                "400": error("Invalid body"),
                "401": error("Client not authorized"),
                "500": error("Data base error"),
            },
        },
    })
}

/// `/T/{id}` with get, update and delete.
pub fn item_path(table: &str) -> Value {
    json!({
        "get": {
            "tags": [table],
            "summary": format!("Get one {} row", table),
            "security": security(),
            "parameters": id_params(),
            "responses": {
                "200": envelope("success", 200000, schema_ref(table)),
                "401": error("Client not authorized"),
                "500": error("Data base error"),
            },
        },
        "put": {
            "tags": [table],
            "summary": format!("Update one {} row", table),
            "security": security(),
            "parameters": id_params(),
            "requestBody": {
                "required": true,
                "content": {"application/json": {"schema": schema_ref(table)}},
            },
            "responses": {
                "201": envelope("success, with the affected row count", 200001, json!({"type": "integer"})),
                "400": error("Invalid body"),
                "401": error("Client not authorized"),
                "500": error("Data base error"),
            },
        },
        "delete": {
            "tags": [table],
            "summary": format!("Delete one {} row", table),
            "security": security(),
            "parameters": id_params(),
            "responses": {
                "201": envelope("success, with the deleted id", 200001, json!({"type": "string"})),
                "401": error("Client not authorized"),
                "500": error("Data base error"),
                "501": error("No row was deleted"),
            },
        },
    })
}

/// `/T/query`.
pub fn query_path(table: &str) -> Value {
    let mut params = vec![query_param("pagination", "boolean", "Set to false to disable pagination, default true")];
    params.extend(page_params());
    json!({
        "post": {
            "tags": [table],
            "summary": format!("Query the {} table", table),
            "security": security(),
            "parameters": params,
            "requestBody": {
                "required": true,
                "content": {"application/json": {"schema": schema_ref(&format!("{}_query", table))}},
            },
            "responses": {
                "200": envelope(
                    "success; code 200001 with a plain array when pagination is disabled",
                    200000,
                    json!({"oneOf": [paginated(table), {"type": "array", "items": schema_ref(table)}]}),
                ),
                "400": error("Invalid body"),
                "401": error("Client not authorized"),
                "500": error("Data base error"),
            },
        },
    })
}
