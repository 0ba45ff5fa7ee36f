//! Policy decided by a configurable HTTP call.
//!
//! String values of the body and header templates that start with `$.` are looked up in
//! `{permissionString, randomString, req}`; the decision is the response value at
//! `valueToEvaluate` compared with `equalTo`.

use super::{AccessPolicy, Decision};
use crate::config::DelegatedSecurity;
use crate::error::AppError;
use crate::extractors::RequestContext;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// `$.req.headers.x-id` -> `/req/headers/x-id`, `$.items[0].ok` -> `/items/0/ok`.
pub fn json_path_to_pointer(path: &str) -> Option<String> {
    let rest = path.strip_prefix("$.")?;
    let normalized = rest.replace('[', ".").replace(']', "");
    let mut pointer = String::new();
    for segment in normalized.split('.').filter(|s| !s.is_empty()) {
        pointer.push('/');
        pointer.push_str(&segment.replace('~', "~0").replace('/', "~1"));
    }
    Some(pointer)
}

/// `None` for paths that are not templates.
fn lookup<'a>(data: &'a Value, template: &str) -> Option<&'a Value> {
    json_path_to_pointer(template).and_then(|p| data.pointer(&p))
}

fn as_header_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub struct DelegatedPolicy {
    client: reqwest::Client,
    config: DelegatedSecurity,
}

impl DelegatedPolicy {
    pub fn new(client: reqwest::Client, config: DelegatedSecurity) -> Self {
        DelegatedPolicy { client, config }
    }

    fn url(&self) -> String {
        format!("{}{}", self.config.http_base_url, self.config.validate_access.endpoint)
    }

    fn render_body(&self, data: &Value) -> Value {
        let mut body = Map::new();
        for (key, template) in &self.config.validate_access.request_conf.body {
            let value = match template {
                Value::String(s) if s.starts_with("$.") => lookup(data, s).cloned().unwrap_or(Value::Null),
                other => other.clone(),
            };
            body.insert(key.clone(), value);
        }
        Value::Object(body)
    }

    fn render_headers(&self, data: &Value) -> Vec<(String, String)> {
        self.config
            .validate_access
            .request_conf
            .headers
            .iter()
            .filter_map(|(key, template)| {
                if template.starts_with("$.") {
                    lookup(data, template).map(|v| (key.clone(), as_header_text(v)))
                } else {
                    Some((key.clone(), template.clone()))
                }
            })
            .collect()
    }
}

#[async_trait]
impl AccessPolicy for DelegatedPolicy {
    async fn authorize(&self, permission: &str, ctx: &RequestContext) -> Result<Decision, AppError> {
        let random = uuid::Uuid::new_v4().simple().to_string();
        let data = ctx.to_template_data(permission, &random[..7]);

        let mut request = self.client.post(self.url()).json(&self.render_body(&data));
        for (name, value) in self.render_headers(&data) {
            request = request.header(name, value);
        }
        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::AuthorizationService(format!("delegated validation failed: {}", e)))?;
        let answer: Value = response
            .json()
            .await
            .map_err(|e| AppError::AuthorizationService(format!("delegated validation failed: {}", e)))?;

        let evaluation = &self.config.validate_access.response_evaluation_config;
        let allowed = lookup(&answer, &evaluation.value_to_evaluate) == Some(&evaluation.equal_to);
        tracing::debug!(permission = %permission, allowed, "delegated check");
        Ok(if allowed { Decision::Allow } else { Decision::Deny })
    }
}
