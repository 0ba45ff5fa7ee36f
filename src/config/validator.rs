//! Settings validation: values that parse but cannot be served.

use crate::config::{SecuritySettings, Settings};
use crate::error::ConfigError;

pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    let root = settings.api_root.as_str();
    if !root.starts_with('/') || root.len() < 2 || root.ends_with('/') {
        return Err(ConfigError::Invalid {
            key: "API_ROOT",
            message: format!("'{}' must start with '/', name a segment and have no trailing '/'", root),
        });
    }
    if settings.max_connections == 0 {
        return Err(ConfigError::Invalid {
            key: "DATABASE_MAX_CONNECTIONS",
            message: "must be at least 1".into(),
        });
    }
    if settings.hide_system_tables && settings.system_table_prefix.is_empty() {
        return Err(ConfigError::Invalid {
            key: "SYSTEM_TABLE_PREFIX",
            message: "must not be empty when HIDE_SYSTEM_TABLES is set".into(),
        });
    }
    match &settings.security {
        SecuritySettings::Disabled => {}
        SecuritySettings::Bearer { endpoint, .. } => {
            if !endpoint.starts_with("http") {
                return Err(ConfigError::Invalid {
                    key: "SECURITY_ENDPOINT",
                    message: format!("'{}' is not an http(s) url", endpoint),
                });
            }
        }
        SecuritySettings::Delegated(delegated) => {
            if !delegated.http_base_url.starts_with("http") {
                return Err(ConfigError::Invalid {
                    key: "SECURITY_CONFIG_PATH",
                    message: format!("httpBaseUrl '{}' is not an http(s) url", delegated.http_base_url),
                });
            }
            if !delegated.validate_access.response_evaluation_config.value_to_evaluate.starts_with("$.") {
                return Err(ConfigError::Invalid {
                    key: "SECURITY_CONFIG_PATH",
                    message: "valueToEvaluate must be a '$.' path".into(),
                });
            }
        }
    }
    for (table, columns) in &settings.table_settings {
        if columns.iter().any(|c| c.is_empty()) {
            return Err(ConfigError::Invalid {
                key: "TABLE_SETTINGS_PATH",
                message: format!("table '{}' lists an empty column name", table),
            });
        }
    }
    Ok(())
}
