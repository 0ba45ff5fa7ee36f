//! Typed errors and HTTP mapping.
//!
//! Every runtime failure leaves a handler as an [`AppError`]; the response carries the
//! standard envelope `{message, code, errorUUID}` and the same UUID is written to the
//! log line so the two can be correlated.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Prefix for messages whose origin is the database driver.
pub const DB_ERROR_PREFIX: &str = "Data base error. ";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing setting: {0}")]
    Missing(&'static str),
    #[error("invalid setting {key}: {message}")]
    Invalid { key: &'static str, message: String },
    #[error("config load: {0}")]
    Load(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{source}")]
    Introspection {
        on_function: &'static str,
        #[source]
        source: sqlx::Error,
    },
    #[error("{0}")]
    Validation(String),
    #[error("Data base error. {source}")]
    QueryExecution {
        on_function: &'static str,
        code: u32,
        #[source]
        source: sqlx::Error,
    },
    #[error("Could not delete from the data base")]
    DeleteNoRowAffected { table: String, affected: u64 },
    #[error("unsupported database engine: {0}")]
    UnsupportedBackend(String),
    #[error("Client not authorized")]
    AuthorizationDenied { permission: String },
    #[error("authorization service failed: {0}")]
    AuthorizationService(String),
    #[error("table {0} already exists")]
    TableAlreadyExists(String),
    #[error("not found: {0}")]
    NotFound(String),
}

impl AppError {
    pub fn introspection(on_function: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
        move |source| AppError::Introspection { on_function, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Introspection { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::QueryExecution { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::DeleteNoRowAffected { .. } => StatusCode::NOT_IMPLEMENTED,
            AppError::UnsupportedBackend(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::AuthorizationDenied { .. } => StatusCode::UNAUTHORIZED,
            AppError::AuthorizationService(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::TableAlreadyExists(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Stable numeric code sent to clients.
    pub fn code(&self) -> u32 {
        match self {
            AppError::Introspection { .. } => 500101,
            AppError::Validation(_) => 400001,
            AppError::QueryExecution { code, .. } => *code,
            AppError::DeleteNoRowAffected { .. } => 500001,
            AppError::UnsupportedBackend(_) => 500201,
            AppError::AuthorizationDenied { .. } => 400801,
            AppError::AuthorizationService(_) => 500801,
            AppError::TableAlreadyExists(_) => 409001,
            AppError::NotFound(_) => 404001,
        }
    }

    pub fn on_function(&self) -> &'static str {
        match self {
            AppError::Introspection { on_function, .. } => *on_function,
            AppError::QueryExecution { on_function, .. } => *on_function,
            AppError::Validation(_) => "validate_request",
            AppError::DeleteNoRowAffected { .. } => "delete_one_by_id",
            AppError::UnsupportedBackend(_) => "ensure_supported",
            AppError::AuthorizationDenied { .. } | AppError::AuthorizationService(_) => "authorize",
            AppError::TableAlreadyExists(_) => "create_table",
            AppError::NotFound(_) => "resolve_endpoint",
        }
    }

    pub fn on_component(&self) -> &'static str {
        match self {
            AppError::Introspection { .. } => "introspect",
            AppError::UnsupportedBackend(_) => "endpoints",
            AppError::AuthorizationDenied { .. } | AppError::AuthorizationService(_) => "auth",
            AppError::TableAlreadyExists(_) => "ddl",
            AppError::NotFound(_) => "registry",
            AppError::Validation(_)
            | AppError::QueryExecution { .. }
            | AppError::DeleteNoRowAffected { .. } => "handlers",
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: u32,
    #[serde(rename = "errorUUID")]
    pub error_uuid: Uuid,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_uuid = Uuid::new_v4();
        let source = std::error::Error::source(&self).map(|s| s.to_string());
        if status.is_server_error() {
            tracing::error!(
                error_uuid = %error_uuid,
                code = self.code(),
                status = status.as_u16(),
                on_function = self.on_function(),
                on_component = self.on_component(),
                original_error = ?source,
                "{}", self
            );
        } else {
            tracing::warn!(
                error_uuid = %error_uuid,
                code = self.code(),
                status = status.as_u16(),
                on_function = self.on_function(),
                on_component = self.on_component(),
                "{}", self
            );
        }
        let body = ErrorBody {
            message: self.to_string(),
            code: self.code(),
            error_uuid,
        };
        (status, Json(body)).into_response()
    }
}
