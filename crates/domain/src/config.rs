//! Provisioning configuration
//!
//! Loads configuration from an optional `.env` file and `PORTICO_*`
//! environment variables, then validates it before anything is wired up.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration consumed by the provisioning use cases and standard steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisioningConfig {
    /// Platform domain tenant sites are served under when no custom domain
    /// is configured (e.g. `portico.site` → `acme.portico.site`).
    pub site_base_domain: String,
    /// Base URL of the tenant administration console.
    pub admin_base_url: String,
    /// Allow a tenant to have more than one QUEUED/RUNNING job at a time.
    pub allow_concurrent_tenant_jobs: bool,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            site_base_domain: "portico.site".to_string(),
            admin_base_url: "https://admin.portico.app".to_string(),
            allow_concurrent_tenant_jobs: false,
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load env file {path}: {message}")]
    EnvFileLoad { path: String, message: String },

    #[error("Invalid value for {variable}: {message}")]
    InvalidValue { variable: String, message: String },

    #[error("Validation failed for {field}: {message}")]
    Validation { field: String, message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Loads [`ProvisioningConfig`] from the environment.
///
/// Variables defined in the optional `.env` file are loaded first and become
/// visible via `std::env::var`, allowing local development overrides without
/// modifying the system environment.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    env_file_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new(env_file_path: Option<PathBuf>) -> Self {
        Self { env_file_path }
    }

    pub fn load(&self) -> ConfigResult<ProvisioningConfig> {
        if let Some(path) = &self.env_file_path {
            dotenvy::from_path(path).map_err(|e| ConfigError::EnvFileLoad {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        }

        let defaults = ProvisioningConfig::default();
        let config = ProvisioningConfig {
            site_base_domain: env_or("PORTICO_SITE_BASE_DOMAIN", defaults.site_base_domain),
            admin_base_url: env_or("PORTICO_ADMIN_BASE_URL", defaults.admin_base_url),
            allow_concurrent_tenant_jobs: env_bool(
                "PORTICO_ALLOW_CONCURRENT_TENANT_JOBS",
                defaults.allow_concurrent_tenant_jobs,
            )?,
        };

        validate_config(&config)?;
        Ok(config)
    }
}

fn env_or(variable: &str, default: String) -> String {
    std::env::var(variable).unwrap_or(default)
}

fn env_bool(variable: &str, default: bool) -> ConfigResult<bool> {
    match std::env::var(variable) {
        Err(_) => Ok(default),
        Ok(raw) => match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                variable: variable.to_string(),
                message: format!("expected a boolean, got '{}'", raw),
            }),
        },
    }
}

fn validate_config(config: &ProvisioningConfig) -> ConfigResult<()> {
    if config.site_base_domain.is_empty() {
        return Err(ConfigError::Validation {
            field: "site_base_domain".to_string(),
            message: "must not be empty".to_string(),
        });
    }
    if config.site_base_domain.contains("://") {
        return Err(ConfigError::Validation {
            field: "site_base_domain".to_string(),
            message: "must be a bare domain, not a URL".to_string(),
        });
    }
    if !config.admin_base_url.starts_with("http://")
        && !config.admin_base_url.starts_with("https://")
    {
        return Err(ConfigError::Validation {
            field: "admin_base_url".to_string(),
            message: "must be an http(s) URL".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&ProvisioningConfig::default()).is_ok());
    }

    #[test]
    fn test_rejects_url_as_base_domain() {
        let config = ProvisioningConfig {
            site_base_domain: "https://portico.site".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Validation { field, .. }) if field == "site_base_domain"
        ));
    }

    #[test]
    fn test_rejects_bare_admin_host() {
        let config = ProvisioningConfig {
            admin_base_url: "admin.portico.app".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Validation { field, .. }) if field == "admin_base_url"
        ));
    }

    #[test]
    fn test_env_bool_parsing() {
        std::env::set_var("PORTICO_TEST_BOOL_A", "true");
        assert!(env_bool("PORTICO_TEST_BOOL_A", false).unwrap());
        std::env::set_var("PORTICO_TEST_BOOL_A", "0");
        assert!(!env_bool("PORTICO_TEST_BOOL_A", true).unwrap());
        std::env::set_var("PORTICO_TEST_BOOL_A", "sometimes");
        assert!(env_bool("PORTICO_TEST_BOOL_A", true).is_err());
        std::env::remove_var("PORTICO_TEST_BOOL_A");
        assert!(env_bool("PORTICO_TEST_BOOL_A", true).unwrap());
    }
}
