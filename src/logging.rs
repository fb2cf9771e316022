// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Logging configuration with structured output
//!
//! Log lines go to stderr so the CLI can keep stdout for its own output.

use anyhow::Result;
use serde_json::json;
use std::env;
use std::io;
use tracing::{debug, info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::constants::service;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Include span information for tracing
    pub include_spans: bool,
    /// Service name for structured logging
    pub service_name: String,
    pub service_version: String,
    /// Environment (development, production)
    pub environment: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON format for machine consumption
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact format, the CLI default
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            include_location: false,
            include_spans: false,
            service_name: service::SERVICE_NAME.to_string(),
            service_version: service::SERVICE_VERSION.to_string(),
            environment: "development".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    pub fn from_env() -> Self {
        let level = env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());

        let format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("pretty") => LogFormat::Pretty,
            _ => LogFormat::Compact,
        };

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let is_production = environment == "production";

        Self {
            level,
            format,
            include_location: is_production || env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_spans: is_production || env::var("LOG_INCLUDE_SPANS").is_ok(),
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| service::SERVICE_NAME.to_string()),
            service_version: service::SERVICE_VERSION.to_string(),
            environment,
        }
    }

    fn span_events(&self) -> FmtSpan {
        if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    /// Initialize the global tracing subscriber
    pub fn init(&self) -> Result<()> {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        let registry = tracing_subscriber::registry().with(env_filter);

        match self.format {
            LogFormat::Json => {
                let json_layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_target(true)
                    .with_writer(io::stderr)
                    .with_span_events(self.span_events())
                    .json();

                registry.with(json_layer).try_init()?;
            }
            LogFormat::Pretty => {
                let pretty_layer = fmt::layer()
                    .pretty()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_target(true)
                    .with_writer(io::stderr)
                    .with_span_events(self.span_events());

                registry.with(pretty_layer).try_init()?;
            }
            LogFormat::Compact => {
                let compact_layer = fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(io::stderr)
                    .with_span_events(FmtSpan::NONE);

                registry.with(compact_layer).try_init()?;
            }
        }

        self.log_startup_info();

        Ok(())
    }

    fn log_startup_info(&self) {
        let config_summary = json!({
            "service": {
                "name": self.service_name,
                "version": self.service_version,
                "environment": self.environment
            },
            "logging": {
                "level": self.level,
                "format": format!("{:?}", self.format),
            }
        });

        debug!("Logging initialized: {}", config_summary);
    }
}

/// Initialize logging from environment
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}

/// Structured events emitted by the tracker and its collaborators
pub struct AppLogger;

impl AppLogger {
    pub fn log_activity_logged(user_id: &str, exercise_type: &str, duration_minutes: u32) {
        info!(
            user.id = %user_id,
            activity.exercise_type = %exercise_type,
            activity.duration_minutes = %duration_minutes,
            "Activity logged"
        );
    }

    pub fn log_plan_generated(user_id: &str, goal: &str, timeline_weeks: u32, disability_type: Option<&str>) {
        info!(
            user.id = %user_id,
            plan.goal = %goal,
            plan.timeline_weeks = %timeline_weeks,
            plan.disability_type = disability_type.unwrap_or("none"),
            "Personalized plan generated"
        );
    }

    pub fn log_milestone_update(user_id: &str, index: usize, completed: bool) {
        info!(
            user.id = %user_id,
            milestone.index = %index,
            milestone.completed = %completed,
            "Milestone updated"
        );
    }

    /// Log storage reads and writes
    pub fn log_storage_operation(operation: &str, key: &str, success: bool, duration_ms: u64) {
        debug!(
            db.operation = %operation,
            db.key = %key,
            db.success = %success,
            db.duration_ms = %duration_ms,
            "Storage operation"
        );
    }

    /// Log user authentication events
    pub fn log_auth_event(email: &str, event: &str, success: bool, details: Option<&str>) {
        if success {
            info!(
                auth.email = %email,
                auth.event = %event,
                auth.success = %success,
                "Authentication event"
            );
        } else {
            warn!(
                auth.email = %email,
                auth.event = %event,
                auth.success = %success,
                auth.details = details.unwrap_or(""),
                "Authentication failure"
            );
        }
    }
}
