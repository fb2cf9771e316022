// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Environment-based configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use tracing::{info, warn};

use super::AppConfig;
use crate::constants::{auth, env_config};

/// Which authentication provider backs sign-in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Accounts stored locally with hashed passwords and JWT sessions
    Local,
    /// Accept any credentials (used when no provider is configured)
    #[default]
    Mock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub mode: AuthMode,
    /// JWT signing secret, required for local mode. Never written back to
    /// disk; read from `JWT_SECRET` when the file omits it.
    #[serde(default, skip_serializing)]
    pub jwt_secret: Option<String>,
    #[serde(default = "default_expiry")]
    pub jwt_expiry_hours: i64,
}

fn default_expiry() -> i64 {
    auth::DEFAULT_JWT_EXPIRY_HOURS
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            mode: AuthMode::Mock,
            jwt_secret: None,
            jwt_expiry_hours: default_expiry(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        // Load .env file if it exists
        if let Err(e) = dotenv::dotenv() {
            warn!("No .env file found or failed to load: {}", e);
        }

        let config = AppConfig {
            database_url: env_config::database_url(),
            user_id: env_config::user_id(),
            auth: AuthSettings {
                mode: parse_auth_mode(&env_config::auth_mode())?,
                jwt_secret: env::var("JWT_SECRET").ok(),
                jwt_expiry_hours: env_config::jwt_expiry_hours(),
            },
            fitness_config_path: env_config::fitness_config_path(),
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.database_url.is_empty() {
            return Err(anyhow::anyhow!("DATABASE_URL cannot be empty"));
        }

        if self.auth.mode == AuthMode::Local && self.auth.jwt_secret.is_none() {
            return Err(anyhow::anyhow!("JWT_SECRET is required when AUTH_MODE is local"));
        }

        if self.auth.jwt_expiry_hours <= 0 {
            return Err(anyhow::anyhow!("JWT_EXPIRY_HOURS must be positive"));
        }

        if self.auth.mode == AuthMode::Mock {
            warn!("Authentication is running in mock mode; any credentials are accepted");
        }

        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    pub fn summary(&self) -> String {
        format!(
            "AdaptFit Configuration:\n\
             - Database: {}\n\
             - User: {}\n\
             - Auth: {:?}\n\
             - Rule tables: {}",
            if self.database_url.starts_with("sqlite:") { "SQLite" } else { "External DB" },
            self.user_id.as_deref().unwrap_or("(not signed in)"),
            self.auth.mode,
            self.fitness_config_path.as_deref().unwrap_or("embedded defaults"),
        )
    }
}

fn parse_auth_mode(value: &str) -> Result<AuthMode> {
    match value.trim().to_lowercase().as_str() {
        "local" => Ok(AuthMode::Local),
        "mock" => Ok(AuthMode::Mock),
        other => Err(anyhow::anyhow!("Invalid AUTH_MODE value: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".to_string(),
            user_id: None,
            auth: AuthSettings::default(),
            fitness_config_path: None,
        }
    }

    #[test]
    fn test_parse_auth_mode() {
        assert_eq!(parse_auth_mode("local").unwrap(), AuthMode::Local);
        assert_eq!(parse_auth_mode(" MOCK ").unwrap(), AuthMode::Mock);
        assert!(parse_auth_mode("oauth").is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = sample_config();
        assert!(config.validate().is_ok());

        // Local mode needs a signing secret
        config.auth.mode = AuthMode::Local;
        assert!(config.validate().is_err());

        config.auth.jwt_secret = Some("secret".to_string());
        assert!(config.validate().is_ok());

        config.database_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_summary_hides_secret() {
        let mut config = sample_config();
        config.auth.jwt_secret = Some("do-not-print".to_string());

        let summary = config.summary();
        assert!(summary.contains("SQLite"));
        assert!(!summary.contains("do-not-print"));
    }
}
