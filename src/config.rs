// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Configuration management for the adaptive fitness tracker

pub mod environment;
pub mod fitness_config;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

pub use environment::{AuthMode, AuthSettings};
pub use fitness_config::FitnessConfig;

/// Application settings: where data lives, who the default user is and how
/// sign-in works
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub database_url: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub fitness_config_path: Option<String>,
}

fn default_config_path() -> String {
    dirs::config_dir()
        .map(|p| p.join("adaptfit/config.toml"))
        .unwrap_or_else(|| "config.toml".into())
        .to_string_lossy()
        .to_string()
}

impl AppConfig {
    /// Load from a TOML file when one exists, otherwise from the environment
    pub fn load(path: Option<String>) -> Result<Self> {
        let config_path = path.unwrap_or_else(default_config_path);

        if Path::new(&config_path).exists() {
            let content = fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            let mut config: Self = toml::from_str(&content)
                .context("Failed to parse config file")?;
            if config.auth.jwt_secret.is_none() {
                config.auth.jwt_secret = env::var("JWT_SECRET").ok();
            }
            Ok(config)
        } else {
            Self::from_env()
        }
    }

    /// Record `user_id` as the default user in the stored configuration,
    /// leaving every other stored setting as it was
    pub fn remember_user(path: Option<String>, user_id: &str) -> Result<()> {
        let mut stored = Self::load(path.clone())?;
        stored.user_id = Some(user_id.to_string());
        stored.save(path)
    }

    pub fn save(&self, path: Option<String>) -> Result<()> {
        let config_path = path.unwrap_or_else(default_config_path);

        let parent = Path::new(&config_path).parent()
            .context("Invalid config path")?;
        fs::create_dir_all(parent)?;

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;

        Ok(())
    }

    /// Rule tables referenced by this configuration
    pub fn fitness_config(&self) -> Result<FitnessConfig> {
        FitnessConfig::load(self.fitness_config_path.clone())
    }
}
