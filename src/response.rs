//! Standard response envelope helpers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Code for a successful read.
pub const CODE_OK: u32 = 200000;
/// Code for a successful write, and for unpaginated query results.
pub const CODE_WRITTEN: u32 = 200001;

#[derive(Serialize)]
pub struct Envelope<T> {
    pub message: &'static str,
    pub code: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<T>,
}

pub fn envelope<T: Serialize>(
    status: StatusCode,
    code: u32,
    message: &'static str,
    content: Option<T>,
) -> Response {
    (status, Json(Envelope { message, code, content })).into_response()
}

/// 200 with `code: 200000` and a content payload.
pub fn success_ok<T: Serialize>(content: T) -> Response {
    envelope(StatusCode::OK, CODE_OK, "success", Some(content))
}

/// 201 with `code: 200001`; content is omitted when `None`.
pub fn success_created<T: Serialize>(content: Option<T>) -> Response {
    envelope(StatusCode::CREATED, CODE_WRITTEN, "success", content)
}

/// 200 with `code: 200001`: the shape marker for unpaginated query results.
pub fn success_unpaginated<T: Serialize>(content: T) -> Response {
    envelope(StatusCode::OK, CODE_WRITTEN, "success", Some(content))
}

pub fn message_only(status: StatusCode, code: u32, message: &'static str) -> Response {
    envelope::<()>(status, code, message, None)
}
