//! Token-introspection policy: the caller's bearer token and the permission are posted
//! to an external endpoint, which answers `{content: {isAllowed}}`.

use super::{AccessPolicy, Decision};
use crate::error::AppError;
use crate::extractors::RequestContext;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenCheck<'a> {
    token: &'a str,
    permission: &'a str,
    app_identifier: &'a str,
}

pub struct BearerTokenPolicy {
    client: reqwest::Client,
    endpoint: String,
    app_identifier: String,
}

impl BearerTokenPolicy {
    pub fn new(client: reqwest::Client, endpoint: String, app_identifier: String) -> Self {
        BearerTokenPolicy {
            client,
            endpoint,
            app_identifier,
        }
    }
}

#[async_trait]
impl AccessPolicy for BearerTokenPolicy {
    async fn authorize(&self, permission: &str, ctx: &RequestContext) -> Result<Decision, AppError> {
        let Some(token) = ctx.bearer_token() else {
            return Ok(Decision::Deny);
        };
        let body = TokenCheck {
            token,
            permission,
            app_identifier: &self.app_identifier,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::AuthorizationService(format!("token validation failed: {}", e)))?;
        let answer: Value = response
            .json()
            .await
            .map_err(|e| AppError::AuthorizationService(format!("token validation failed: {}", e)))?;
        let allowed = answer.pointer("/content/isAllowed").and_then(Value::as_bool) == Some(true);
        tracing::debug!(permission = %permission, allowed, "token checked");
        Ok(if allowed { Decision::Allow } else { Decision::Deny })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue};
    use mockito::Matcher;
    use serde_json::json;

    fn with_token(token: &'static str) -> RequestContext {
        let mut ctx = RequestContext::default();
        ctx.headers.insert(header::AUTHORIZATION, HeaderValue::from_static(token));
        ctx
    }

    #[tokio::test]
    async fn allowed_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/validate")
            .match_body(Matcher::Json(json!({
                "token": "t0k",
                "permission": "users:select",
                "appIdentifier": "zero-code"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":200000,"message":"ok","content":{"isAllowed":true,"subject":"ann"}}"#)
            .create_async()
            .await;
        let policy = BearerTokenPolicy::new(
            reqwest::Client::new(),
            format!("{}/validate", server.url()),
            "zero-code".into(),
        );
        let decision = policy.authorize("users:select", &with_token("Bearer t0k")).await.unwrap();
        assert_eq!(decision, Decision::Allow);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn refused_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/validate")
            .with_status(200)
            .with_body(r#"{"content":{"isAllowed":false}}"#)
            .create_async()
            .await;
        let policy = BearerTokenPolicy::new(reqwest::Client::new(), format!("{}/validate", server.url()), String::new());
        let decision = policy.authorize("users:delete", &with_token("Bearer t0k")).await.unwrap();
        assert_eq!(decision, Decision::Deny);
    }

    #[tokio::test]
    async fn missing_token_is_denied_without_a_call() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", "/validate").expect(0).create_async().await;
        let policy = BearerTokenPolicy::new(reqwest::Client::new(), format!("{}/validate", server.url()), String::new());
        let decision = policy.authorize("users:select", &RequestContext::default()).await.unwrap();
        assert_eq!(decision, Decision::Deny);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn service_failure_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server.mock("POST", "/validate").with_status(503).create_async().await;
        let policy = BearerTokenPolicy::new(reqwest::Client::new(), format!("{}/validate", server.url()), String::new());
        let err = policy.authorize("users:select", &with_token("Bearer t0k")).await.unwrap_err();
        assert!(matches!(err, AppError::AuthorizationService(_)));
        assert_eq!(err.code(), 500801);
    }
}
