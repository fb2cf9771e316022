// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Intelligence Module
//!
//! The rule-based "smart" parts of the tracker. Nothing here learns or calls
//! out to a model: every engine is a deterministic lookup over the tables in
//! [`crate::config::FitnessConfig`] or a small pure calculation.
//!
//! This module includes:
//! - Derived metrics (BMI, streaks, mood averages, plan progress)
//! - Personalized plan generation
//! - Free-text activity parsing
//! - The adaptive workout catalog
//! - Health/progress insights and encouragement text

pub mod activity_parser;
pub mod insights;
pub mod metrics;
pub mod plan_engine;
pub mod workouts;

pub use activity_parser::{ActivityParser, ParsedActivity};
pub use insights::{gentle_nudge, health_insights, motivational_message, progress_insights};
pub use metrics::{
    activities_this_week, average_mood, bmi, calculate_health_metrics, calculate_streak,
    current_plan_week, days_since_last_activity, mood_emoji, plan_progress, progress_deltas,
    BmiCategory, HealthMetrics, PlanProgress, ProgressDelta,
};
pub use plan_engine::PlanGenerator;
pub use workouts::{filter_by_difficulty, recommend_workouts};
