// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Adaptive Fitness
//!
//! Rule logic of an adaptive fitness tracker for people with disabilities:
//! activity logging from free text, personalized plans that respect a user's
//! disability type, and the derived metrics shown on a dashboard.
//!
//! ## Features
//!
//! - **Derived metrics**: BMI and category, streaks, mood averages, plan progress
//! - **Plan generation**: goal templates, disability-adjusted timelines, milestones
//! - **Activity parsing**: keyword classification of free-text activity notes
//! - **Workout catalog**: adaptive workouts keyed by disability type
//! - **Pluggable storage**: per-user JSON documents behind a key-value trait
//!
//! ## Architecture
//!
//! - **Models**: plain records with serde layouts and scale validation
//! - **Intelligence**: the rule engines, all pure functions over the models
//! - **Config**: rule tables (TOML-overridable) and runtime settings
//! - **Database**: `KeyValueStore` with SQLite and in-memory backends
//! - **Tracker**: per-user save/load flows tying the engines to storage
//! - **Auth**: sign-in providers and error translation
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use adaptive_fitness::config::FitnessConfig;
//! use adaptive_fitness::database::SqliteStore;
//! use adaptive_fitness::tracker::FitnessTracker;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = SqliteStore::new("sqlite::memory:").await?;
//!     let tracker = FitnessTracker::new(store, "user_demo", FitnessConfig::default())?;
//!
//!     let activity = tracker
//!         .log_activity_text("Did 20 minutes of wheelchair cardio, felt great", chrono::Utc::now())
//!         .await?;
//!     println!("{} for {} min", activity.exercise_type, activity.duration);
//!
//!     Ok(())
//! }
//! ```

/// Authentication providers and error translation
pub mod auth;

/// Rule tables and application configuration
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Key-value document storage
pub mod database;

/// Rule engines: metrics, plans, parsing, workouts and insights
pub mod intelligence;

/// Structured logging setup
pub mod logging;

/// Common data models
pub mod models;

/// Per-user save and load flows
pub mod tracker;
