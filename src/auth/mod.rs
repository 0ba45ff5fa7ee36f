//! Authorization gate: every dispatched endpoint asks `authorize(permission)` first.
//!
//! The decision itself belongs to a pluggable [`AccessPolicy`]; which one is active is
//! chosen from [`SecuritySettings`] at startup.

mod bearer;
mod delegated;

pub use bearer::BearerTokenPolicy;
pub use delegated::{json_path_to_pointer, DelegatedPolicy};

use crate::config::SecuritySettings;
use crate::error::AppError;
use crate::extractors::RequestContext;
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

#[async_trait]
pub trait AccessPolicy: Send + Sync {
    /// `Err` only when the decision could not be made.
    async fn authorize(&self, permission: &str, ctx: &RequestContext) -> Result<Decision, AppError>;
}

/// Used when security is disabled.
pub struct AllowAll;

#[async_trait]
impl AccessPolicy for AllowAll {
    async fn authorize(&self, _permission: &str, _ctx: &RequestContext) -> Result<Decision, AppError> {
        Ok(Decision::Allow)
    }
}

#[derive(Clone)]
pub struct AuthorizationGate {
    policy: Arc<dyn AccessPolicy>,
}

impl AuthorizationGate {
    pub fn new(policy: Arc<dyn AccessPolicy>) -> Self {
        AuthorizationGate { policy }
    }

    pub fn from_settings(security: &SecuritySettings) -> Self {
        let client = reqwest::Client::new();
        let policy: Arc<dyn AccessPolicy> = match security {
            SecuritySettings::Disabled => {
                tracing::warn!("security disabled: every endpoint is open");
                Arc::new(AllowAll)
            }
            SecuritySettings::Bearer { endpoint, app_identifier } => {
                tracing::info!(endpoint = %endpoint, "bearer token security");
                Arc::new(BearerTokenPolicy::new(client, endpoint.clone(), app_identifier.clone()))
            }
            SecuritySettings::Delegated(config) => {
                tracing::info!(base_url = %config.http_base_url, "delegated security");
                Arc::new(DelegatedPolicy::new(client, config.clone()))
            }
        };
        Self::new(policy)
    }

    pub async fn authorize(&self, permission: &str, ctx: &RequestContext) -> Result<(), AppError> {
        match self.policy.authorize(permission, ctx).await? {
            Decision::Allow => Ok(()),
            Decision::Deny => Err(AppError::AuthorizationDenied {
                permission: permission.to_string(),
            }),
        }
    }
}
