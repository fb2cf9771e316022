// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Derived metrics: BMI, streaks, mood averages and progress deltas
//!
//! Every function here is pure. Anything time-dependent takes the reference
//! instant `now` as an argument.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::defaults;
use crate::models::{Activity, BaselineData, PersonalizedPlan, ProgressEntry, StreakData};

use super::insights::health_insights;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Body mass index category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    NormalWeight,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// Classify a raw (unrounded) BMI value. Boundaries are closed-open.
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::NormalWeight
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Underweight => "Underweight",
            Self::NormalWeight => "Normal weight",
            Self::Overweight => "Overweight",
            Self::Obese => "Obese",
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// weight_kg / height_m²
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// BMI summary shown after the baseline assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetrics {
    /// Rounded to one decimal
    pub bmi: f64,
    pub bmi_category: BmiCategory,
    pub insights: Vec<String>,
}

pub fn calculate_health_metrics(baseline: &BaselineData) -> HealthMetrics {
    let raw = bmi(baseline.weight_kg, baseline.height_cm);
    HealthMetrics {
        bmi: (raw * 10.0).round() / 10.0,
        bmi_category: BmiCategory::from_bmi(raw),
        insights: health_insights(baseline),
    }
}

fn whole_days_between(later: DateTime<Utc>, earlier: DateTime<Utc>) -> i64 {
    (later - earlier).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

fn newest_first(activities: &[Activity]) -> Vec<&Activity> {
    let mut sorted: Vec<&Activity> = activities.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
}

/// Walk activities newest first, extending the streak while each gap (in whole
/// days from the previous check date) is at most `current_streak + 1`.
pub fn calculate_streak(activities: &[Activity], now: DateTime<Utc>) -> StreakData {
    let sorted = newest_first(activities);

    let mut current_streak: u32 = 0;
    let mut check_date = now;

    for activity in &sorted {
        let days = whole_days_between(check_date, activity.created_at);
        if days <= i64::from(current_streak) + 1 {
            current_streak += 1;
            check_date = activity.created_at;
        } else {
            break;
        }
    }

    let longest_streak = current_streak.max((activities.len() / 3) as u32);

    StreakData {
        current_streak,
        longest_streak,
        total_activities: activities.len(),
        last_activity_date: sorted.first().map(|a| a.created_at),
    }
}

/// Whole days since the newest activity, or the no-activity gap when empty
pub fn days_since_last_activity(activities: &[Activity], now: DateTime<Utc>) -> i64 {
    activities
        .iter()
        .map(|a| a.created_at)
        .max()
        .map_or(defaults::NO_ACTIVITY_GAP_DAYS, |last| whole_days_between(now, last))
}

/// Sunday 00:00 UTC of the week containing `now`
pub fn start_of_week(now: DateTime<Utc>) -> DateTime<Utc> {
    let offset = i64::from(now.weekday().num_days_from_sunday());
    let sunday = now.date_naive() - Duration::days(offset);
    sunday.and_time(NaiveTime::MIN).and_utc()
}

pub fn activities_this_week(activities: &[Activity], now: DateTime<Utc>) -> usize {
    let week_start = start_of_week(now);
    activities.iter().filter(|a| a.created_at >= week_start).count()
}

/// Mean mood score, `None` for an empty list
pub fn average_mood(activities: &[Activity]) -> Option<f64> {
    if activities.is_empty() {
        return None;
    }
    let total: u32 = activities.iter().map(|a| u32::from(a.mood.score())).sum();
    Some(f64::from(total) / activities.len() as f64)
}

pub fn mood_emoji(average: f64) -> &'static str {
    if average >= 4.5 {
        "😊"
    } else if average >= 3.5 {
        "🙂"
    } else if average >= 2.5 {
        "😐"
    } else if average >= 1.5 {
        "😔"
    } else {
        "😞"
    }
}

/// Latest progress entry compared against the baseline assessment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressDelta {
    /// latest - baseline
    pub weight_change_kg: Option<f64>,
    pub weight_change_percent: Option<f64>,
    /// baseline - latest, positive means less pain
    pub pain_change: Option<i16>,
    /// latest - baseline
    pub energy_change: Option<i16>,
    /// latest mobility score - baseline mobility level score
    pub mobility_change: Option<i16>,
}

/// Deltas of the newest entry (entries are stored newest first)
pub fn progress_deltas(baseline: &BaselineData, entries: &[ProgressEntry]) -> Option<ProgressDelta> {
    let latest = entries.first()?;

    let weight_change_kg = latest.weight_kg.map(|w| w - baseline.weight_kg);
    Some(ProgressDelta {
        weight_change_kg,
        weight_change_percent: weight_change_kg.map(|c| c * 100.0 / baseline.weight_kg),
        pain_change: latest
            .pain_level
            .map(|p| i16::from(baseline.pain_level) - i16::from(p)),
        energy_change: latest
            .energy_level
            .map(|e| i16::from(e) - i16::from(baseline.energy_level)),
        mobility_change: latest
            .mobility_score
            .map(|m| i16::from(m) - i16::from(baseline.mobility_level.baseline_score())),
    })
}

/// Milestone completion against elapsed plan time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanProgress {
    pub current_week: u32,
    pub completed_milestones: usize,
    pub total_milestones: usize,
    pub completion_percent: f64,
    pub expected_percent: f64,
    pub is_ahead: bool,
}

/// Whole weeks since the plan was created, rounded up and capped at the
/// timeline. Without a plan this is week 1.
pub fn current_plan_week(plan: Option<&PersonalizedPlan>, now: DateTime<Utc>) -> u32 {
    let Some(plan) = plan else {
        return 1;
    };

    let elapsed = (now - plan.created_at).num_milliseconds().abs();
    let week_millis = 7 * MILLIS_PER_DAY;
    let weeks = (elapsed + week_millis - 1) / week_millis;

    u32::try_from(weeks)
        .unwrap_or(u32::MAX)
        .min(plan.timeline_weeks)
}

pub fn plan_progress(plan: &PersonalizedPlan, current_week: u32) -> PlanProgress {
    let total_milestones = plan.milestones.len();
    let completed_milestones = plan.milestones.iter().filter(|m| m.completed).count();

    let completion_percent = if total_milestones == 0 {
        0.0
    } else {
        completed_milestones as f64 / total_milestones as f64 * 100.0
    };

    let expected_percent = if plan.timeline_weeks == 0 {
        0.0
    } else {
        f64::from(current_week.min(plan.timeline_weeks)) / f64::from(plan.timeline_weeks) * 100.0
    };

    PlanProgress {
        current_week,
        completed_milestones,
        total_milestones,
        completion_percent,
        expected_percent,
        is_ahead: completion_percent > expected_percent,
    }
}
