//! Component schemas: one row schema and one query-body schema per table.

use crate::introspect::ColumnMetadata;
use serde_json::{json, Map, Value};

/// Operations accepted by the filter DSL, as spelled on the wire.
pub const FILTER_OPERATIONS: [&str; 10] = ["<", ">", "=", "<=", ">=", "<>", "in", "between", "like", "null"];

/// OpenAPI `type` and optional `format` for a MySQL column.
pub fn openapi_type(column: &ColumnMetadata) -> (&'static str, Option<&'static str>) {
    let data_type = column.data_type.to_ascii_lowercase();
    if data_type == "tinyint" && column.column_type.to_ascii_lowercase().starts_with("tinyint(1)") {
        return ("boolean", None);
    }
    match data_type.as_str() {
        "bigint" => ("integer", Some("int64")),
        "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "year" => ("integer", Some("int32")),
        "float" => ("number", Some("float")),
        "double" | "real" => ("number", Some("double")),
        // Decoded as strings to keep precision.
        "decimal" | "numeric" => ("string", Some("decimal")),
        "date" => ("string", Some("date")),
        "datetime" | "timestamp" => ("string", Some("date-time")),
        "json" => ("object", None),
        "binary" | "varbinary" | "blob" | "tinyblob" | "mediumblob" | "longblob" => ("string", Some("binary")),
        _ => ("string", None),
    }
}

fn column_property(column: &ColumnMetadata) -> Value {
    let (kind, format) = openapi_type(column);
    let mut property = Map::new();
    property.insert("type".into(), json!(kind));
    if let Some(format) = format {
        property.insert("format".into(), json!(format));
    }
    if column.nullable {
        property.insert("nullable".into(), json!(true));
    }
    if !column.comment.is_empty() {
        property.insert("description".into(), json!(column.comment));
    }
    property.insert("x-column-type".into(), json!(column.column_type));
    Value::Object(property)
}

/// Object schema of one row; `required` lists exactly the non-nullable columns and is
/// left out when there are none.
pub fn table_schema(columns: &[ColumnMetadata]) -> Value {
    let required: Vec<&str> = columns.iter().filter(|c| !c.nullable).map(|c| c.name.as_str()).collect();
    let properties: Map<String, Value> = columns.iter().map(|c| (c.name.clone(), column_property(c))).collect();
    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    if !required.is_empty() {
        schema.insert("required".into(), json!(required));
    }
    schema.insert("properties".into(), Value::Object(properties));
    Value::Object(schema)
}

/// Body of `POST /T/query`, with column names restricted to the table's.
pub fn query_schema(columns: &[ColumnMetadata]) -> Value {
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    json!({
        "type": "object",
        "required": ["filters"],
        "properties": {
            "filters": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["column", "operation"],
                    "properties": {
                        "column": {"type": "string", "enum": names},
                        "value": {},
                        "operation": {"type": "string", "enum": FILTER_OPERATIONS},
                        "negate": {"type": "boolean"},
                        "connector": {"type": "string", "enum": ["and", "or"], "default": "or"},
                    },
                },
            },
            "fields": {
                "type": "array",
                "items": {"type": "string", "enum": names},
            },
            "pagination": {
                "type": "object",
                "properties": {
                    "pagination": {"type": "boolean", "default": true},
                    "itemsPerPage": {"type": "integer"},
                    "pageIndex": {"type": "integer"},
                },
            },
            "sort": {
                "type": "object",
                "properties": {
                    "column": {"type": "string", "enum": names},
                    "direction": {"type": "string", "enum": ["asc", "desc"]},
                },
            },
        },
    })
}

/// Error envelope shared by every operation.
pub fn error_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "message": {"type": "string"},
            "code": {"type": "integer", "example": 500001},
            "errorUUID": {"type": "string", "format": "uuid"},
        },
    })
}
