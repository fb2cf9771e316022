// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Constants Module
//!
//! Application constants and environment-based configuration values.
//! This module provides both hardcoded constants and environment variable configuration.

use std::env;

/// Bounds of the pain / energy / mobility scales
pub mod scales {
    pub const SCALE_MIN: u8 = 1;
    pub const SCALE_MAX: u8 = 10;
}

/// Storage namespace kinds. Keys are `{kind}_{user_id}`.
pub mod storage_keys {
    pub const PROFILE: &str = "profile";
    pub const ACTIVITIES: &str = "activities";
    pub const BASELINE: &str = "baseline";
    pub const TARGETS: &str = "targets";
    pub const PLAN: &str = "plan";
    pub const PROGRESS: &str = "progress";
    pub const ACCOUNT: &str = "account";

    /// Table backing the SQLite key-value store
    pub const KV_TABLE: &str = "kv_store";
}

/// Defaults used by the rule engines
pub mod defaults {
    /// Duration assumed when free text has no duration phrase
    pub const ACTIVITY_DURATION_MINUTES: u32 = 15;

    /// Days reported since the last activity when none was ever logged
    pub const NO_ACTIVITY_GAP_DAYS: i64 = 7;

    /// Exercise type used when no keyword matches
    pub const EXERCISE_TYPE: &str = "general activity";

    /// Disability type whose workouts are recommended when none matches
    pub const WORKOUT_DISABILITY_TYPE: &str = "mobility_aid";

    /// Timeline used by the CLI when none is given
    pub const TIMELINE_WEEKS: u32 = 12;

    /// Weekly sessions used by the CLI when none are given
    pub const WEEKLY_SESSIONS: u32 = 3;

    /// Longest timeline accepted for fitness targets (ten years)
    pub const MAX_TIMELINE_WEEKS: u32 = 520;
}

/// Authentication constants
pub mod auth {
    /// Session token handed out by the unconfigured mock provider
    pub const MOCK_ACCESS_TOKEN: &str = "mock-token";

    /// Prefix of mock user identifiers
    pub const MOCK_USER_PREFIX: &str = "user_";

    /// Number of base64 characters kept in a mock user identifier
    pub const MOCK_USER_ID_LEN: usize = 10;

    pub const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;
}

/// Environment-based configuration
pub mod env_config {
    use super::env;

    /// Get database URL from environment or default
    pub fn database_url() -> String {
        env::var("DATABASE_URL").unwrap_or_else(|_| default_database_url())
    }

    /// SQLite file in the platform data directory
    pub fn default_database_url() -> String {
        let path = dirs::data_dir()
            .map(|p| p.join("adaptfit").join("adaptfit.db"))
            .unwrap_or_else(|| "./data/adaptfit.db".into());
        format!("sqlite:{}", path.to_string_lossy())
    }

    /// Get the default user id from environment
    pub fn user_id() -> Option<String> {
        env::var("ADAPTFIT_USER").ok()
    }

    /// Get auth mode (`local` or `mock`) from environment or default
    pub fn auth_mode() -> String {
        env::var("AUTH_MODE").unwrap_or_else(|_| "mock".to_string())
    }

    /// Get JWT expiry in hours from environment or default
    pub fn jwt_expiry_hours() -> i64 {
        env::var("JWT_EXPIRY_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(super::auth::DEFAULT_JWT_EXPIRY_HOURS)
    }

    /// Get fitness rule table path from environment
    pub fn fitness_config_path() -> Option<String> {
        env::var("FITNESS_CONFIG_PATH").ok()
    }
}

/// Service metadata
pub mod service {
    pub const SERVICE_NAME: &str = "adaptfit";
    pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");
}
