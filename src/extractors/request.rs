//! Fixed-shape view of the inbound request handed to handlers and policies.

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Query},
    http::{header, request::Parts, HeaderMap, Method},
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub query: HashMap<String, String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map(|Query(q)| q)
            .unwrap_or_default();
        Ok(RequestContext {
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            headers: parts.headers.clone(),
            query,
        })
    }
}

impl RequestContext {
    /// Non-empty query parameter.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    fn header(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
    }

    /// Token of an `Authorization: Bearer <token>` header.
    pub fn bearer_token(&self) -> Option<&str> {
        let value = self.header(header::AUTHORIZATION)?;
        let (scheme, token) = value.split_once(' ')?;
        let token = token.trim();
        (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
    }

    /// `scheme://host` as the client addressed us.
    pub fn host_base(&self) -> String {
        let scheme = self
            .header("x-forwarded-proto")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or("http");
        let host = self.header(header::HOST).unwrap_or("localhost");
        format!("{}://{}", scheme, host)
    }

    /// Data that `$.` templates of the delegated policy are resolved against.
    pub fn to_template_data(&self, permission: &str, random: &str) -> Value {
        let headers: Map<String, Value> = self
            .headers
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), Value::String(v.to_string()))))
            .collect();
        json!({
            "permissionString": permission,
            "randomString": random,
            "req": {
                "method": self.method.as_str(),
                "path": self.path,
                "query": self.query,
                "headers": headers,
            }
        })
    }
}
