// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Data Models
//!
//! Plain records shared by the engines, the tracker and the storage layer.
//! Every model serializes to the JSON layout that is written under the
//! per-user storage keys, so field names and enum values are snake_case.
//!
//! ## Core Models
//!
//! - [`UserProfile`]: onboarding answers, including the disability type
//! - [`BaselineData`]: the initial physical assessment
//! - [`FitnessTargets`]: the active goal and timeline
//! - [`PersonalizedPlan`]: the generated plan with its [`PlanMilestone`]s
//! - [`ProgressEntry`]: a dated progress snapshot
//! - [`Activity`]: one logged exercise event
//!
//! Pain, energy and mobility scores are integers on a 1-10 scale. Use the
//! `validate` methods before persisting user input.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::defaults;
use crate::constants::scales::{SCALE_MAX, SCALE_MIN};

/// Errors raised when user-supplied records break a model invariant
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be between 1 and 10, got {value}")]
    ScaleOutOfRange { field: &'static str, value: u8 },

    #[error("{field} must be greater than zero")]
    NonPositive { field: &'static str },

    #[error("{field} must be at most {max}, got {value}")]
    TooLarge { field: &'static str, value: u32, max: u32 },

    #[error("Unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}

fn check_scale(field: &'static str, value: u8) -> Result<(), ValidationError> {
    if (SCALE_MIN..=SCALE_MAX).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::ScaleOutOfRange { field, value })
    }
}

fn check_optional_scale(field: &'static str, value: Option<u8>) -> Result<(), ValidationError> {
    value.map_or(Ok(()), |v| check_scale(field, v))
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NonPositive { field })
    }
}

/// Implements `as_str`, `Display` and `FromStr` for a snake_case enum
macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Stored string form of this value
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(ValidationError::UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

/// Accessibility settings chosen by the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityPreferences {
    pub high_contrast: bool,
    pub large_text: bool,
    pub voice_enabled: bool,
}

/// User profile captured during onboarding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub full_name: String,
    /// Free-form category such as `wheelchair`, `mobility_aid` or `chronic_pain`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disability_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobility_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitness_goals: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility_preferences: Option<AccessibilityPreferences>,
    pub created_at: DateTime<Utc>,
}

/// Self-reported sex on the baseline assessment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
    Other,
    #[default]
    PreferNotToSay,
}

string_enum!(Sex, "sex", {
    Male => "male",
    Female => "female",
    Other => "other",
    PreferNotToSay => "prefer_not_to_say",
});

/// Coarse mobility level reported on the baseline assessment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MobilityLevel {
    Limited,
    #[default]
    Moderate,
    Good,
    Excellent,
}

string_enum!(MobilityLevel, "mobility level", {
    Limited => "limited",
    Moderate => "moderate",
    Good => "good",
    Excellent => "excellent",
});

impl MobilityLevel {
    /// Equivalent position on the 1-10 mobility score scale
    pub fn baseline_score(&self) -> u8 {
        match self {
            Self::Limited => 3,
            Self::Moderate => 5,
            Self::Good => 7,
            Self::Excellent => 9,
        }
    }
}

/// Initial physical assessment. Re-submitted to update, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineData {
    pub height_cm: f64,
    pub weight_kg: f64,
    pub age: u32,
    pub sex: Sex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_fat_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muscle_mass_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resting_heart_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_pressure_systolic: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_pressure_diastolic: Option<u32>,
    pub mobility_level: MobilityLevel,
    /// 1-10 scale
    pub pain_level: u8,
    /// 1-10 scale
    pub energy_level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_medications: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_conditions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_injuries: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_limitations: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BaselineData {
    /// Check body measurements and the 1-10 scales
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_positive("height_cm", self.height_cm)?;
        check_positive("weight_kg", self.weight_kg)?;
        check_scale("pain_level", self.pain_level)?;
        check_scale("energy_level", self.energy_level)
    }
}

/// Primary fitness goal selected when setting targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryGoal {
    WeightLoss,
    WeightGain,
    MuscleGain,
    FatLoss,
    MobilityImprovement,
    PainManagement,
    EnduranceBuilding,
    StrengthBuilding,
    #[default]
    GeneralWellness,
}

string_enum!(PrimaryGoal, "primary goal", {
    WeightLoss => "weight_loss",
    WeightGain => "weight_gain",
    MuscleGain => "muscle_gain",
    FatLoss => "fat_loss",
    MobilityImprovement => "mobility_improvement",
    PainManagement => "pain_management",
    EnduranceBuilding => "endurance_building",
    StrengthBuilding => "strength_building",
    GeneralWellness => "general_wellness",
});

/// The single active goal definition for a user. Replaced wholesale on edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessTargets {
    pub primary_goal: PrimaryGoal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_body_fat_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_muscle_mass_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobility_goals: Option<String>,
    pub timeline_weeks: u32,
    /// Sessions per week
    pub weekly_activity_target: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_goals: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FitnessTargets {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeline_weeks == 0 {
            return Err(ValidationError::NonPositive { field: "timeline_weeks" });
        }
        if self.timeline_weeks > defaults::MAX_TIMELINE_WEEKS {
            return Err(ValidationError::TooLarge {
                field: "timeline_weeks",
                value: self.timeline_weeks,
                max: defaults::MAX_TIMELINE_WEEKS,
            });
        }
        if self.weekly_activity_target == 0 {
            return Err(ValidationError::NonPositive { field: "weekly_activity_target" });
        }
        if let Some(target) = self.target_weight_kg {
            check_positive("target_weight_kg", target)?;
        }
        Ok(())
    }
}

/// Percentage split of weekly training time by intensity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntensityDistribution {
    pub low: u8,
    pub moderate: u8,
    pub high: u8,
}

/// Weekly volume a plan asks for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTargets {
    pub activity_sessions: u32,
    pub total_minutes: u32,
    pub intensity_distribution: IntensityDistribution,
}

/// Metrics a milestone is expected to reach
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_change_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobility_improvement: Option<String>,
}

/// A check-in point inside a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanMilestone {
    pub week: u32,
    pub title: String,
    pub description: String,
    pub target_metrics: TargetMetrics,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl PlanMilestone {
    /// Mark the milestone (un)completed, stamping or clearing the completion time
    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        self.completed = completed;
        self.completed_at = completed.then_some(now);
    }
}

/// Plan generated from baseline, targets and disability type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalizedPlan {
    pub id: String,
    pub user_id: String,
    pub plan_name: String,
    pub description: String,
    pub primary_goal: PrimaryGoal,
    /// Timeline after the disability adjustment
    pub timeline_weeks: u32,
    pub weekly_targets: WeeklyTargets,
    pub milestones: Vec<PlanMilestone>,
    pub recommendations: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Optional body measurements recorded with a progress entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyMeasurements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chest_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waist_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hips_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arms_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thighs_cm: Option<f64>,
}

/// Dated progress snapshot. Stored newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub id: String,
    pub user_id: String,
    pub entry_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_fat_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muscle_mass_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobility_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pain_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurements: Option<BodyMeasurements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ProgressEntry {
    /// Create an empty entry for the given date
    pub fn new(user_id: &str, entry_date: NaiveDate, created_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            entry_date,
            weight_kg: None,
            body_fat_percentage: None,
            muscle_mass_kg: None,
            mobility_score: None,
            pain_level: None,
            energy_level: None,
            measurements: None,
            notes: None,
            photos: Vec::new(),
            created_at,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_optional_scale("mobility_score", self.mobility_score)?;
        check_optional_scale("pain_level", self.pain_level)?;
        check_optional_scale("energy_level", self.energy_level)?;
        if let Some(weight) = self.weight_kg {
            check_positive("weight_kg", weight)?;
        }
        Ok(())
    }
}

/// Perceived effort of an activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Low,
    #[default]
    Moderate,
    High,
}

string_enum!(Intensity, "intensity", {
    Low => "low",
    Moderate => "moderate",
    High => "high",
});

/// How the user felt during an activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Great,
    Good,
    #[default]
    Okay,
    Tired,
    Struggling,
}

string_enum!(Mood, "mood", {
    Great => "great",
    Good => "good",
    Okay => "okay",
    Tired => "tired",
    Struggling => "struggling",
});

impl Mood {
    /// Numeric score used for mood averages (struggling = 1 .. great = 5)
    pub fn score(&self) -> u8 {
        match self {
            Self::Struggling => 1,
            Self::Tired => 2,
            Self::Okay => 3,
            Self::Good => 4,
            Self::Great => 5,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Struggling => "😞",
            Self::Tired => "😔",
            Self::Okay => "😐",
            Self::Good => "🙂",
            Self::Great => "😊",
        }
    }
}

/// One logged exercise event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub user_id: String,
    pub exercise_type: String,
    /// Duration in minutes
    pub duration: u32,
    pub intensity: Intensity,
    pub mood: Mood,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Streak summary shown on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreakData {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_activities: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity_date: Option<DateTime<Utc>>,
}

/// Difficulty tier of a catalog workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

string_enum!(DifficultyLevel, "difficulty level", {
    Beginner => "beginner",
    Intermediate => "intermediate",
    Advanced => "advanced",
});

/// Single movement inside a workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    pub description: String,
    pub duration_or_reps: String,
    pub modifications: Vec<String>,
    pub safety_notes: Vec<String>,
}

/// Adaptive workout from the recommendation catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    pub title: String,
    pub description: String,
    pub exercises: Vec<Exercise>,
    pub difficulty_level: DifficultyLevel,
    pub disability_adaptations: Vec<String>,
    pub duration_minutes: u32,
    pub equipment_needed: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline() -> BaselineData {
        BaselineData {
            height_cm: 170.0,
            weight_kg: 70.0,
            age: 40,
            sex: Sex::PreferNotToSay,
            body_fat_percentage: None,
            muscle_mass_kg: None,
            resting_heart_rate: None,
            blood_pressure_systolic: None,
            blood_pressure_diastolic: None,
            mobility_level: MobilityLevel::Limited,
            pain_level: 5,
            energy_level: 5,
            current_medications: None,
            medical_conditions: None,
            previous_injuries: None,
            activity_limitations: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_baseline_scale_validation() {
        let mut data = baseline();
        assert!(data.validate().is_ok());

        data.pain_level = 11;
        assert_eq!(
            data.validate(),
            Err(ValidationError::ScaleOutOfRange { field: "pain_level", value: 11 })
        );

        data.pain_level = 3;
        data.energy_level = 0;
        assert!(data.validate().is_err());
    }

    #[test]
    fn test_baseline_requires_positive_body_metrics() {
        let mut data = baseline();
        data.height_cm = 0.0;
        assert_eq!(data.validate(), Err(ValidationError::NonPositive { field: "height_cm" }));
    }

    #[test]
    fn test_progress_entry_optional_scales() {
        let mut entry = ProgressEntry::new("u1", NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), Utc::now());
        assert!(entry.validate().is_ok());

        entry.mobility_score = Some(10);
        entry.pain_level = Some(1);
        assert!(entry.validate().is_ok());

        entry.energy_level = Some(12);
        assert!(entry.validate().is_err());
    }

    #[test]
    fn test_enum_string_forms() {
        assert_eq!("mobility_improvement".parse::<PrimaryGoal>(), Ok(PrimaryGoal::MobilityImprovement));
        assert_eq!(PrimaryGoal::PainManagement.to_string(), "pain_management");
        assert_eq!(" Great ".parse::<Mood>(), Ok(Mood::Great));
        assert!("sprinting".parse::<Intensity>().is_err());

        let json = serde_json::to_string(&Sex::PreferNotToSay).unwrap();
        assert_eq!(json, "\"prefer_not_to_say\"");
    }

    #[test]
    fn test_mood_scores_and_emoji() {
        assert_eq!(Mood::Struggling.score(), 1);
        assert_eq!(Mood::Great.score(), 5);
        assert_eq!(Mood::Okay.emoji(), "😐");
        assert_eq!(MobilityLevel::Excellent.baseline_score(), 9);
    }

    #[test]
    fn test_milestone_completion_stamp() {
        let mut milestone = PlanMilestone {
            week: 3,
            title: "First Quarter Check-in".to_string(),
            description: String::new(),
            target_metrics: TargetMetrics::default(),
            completed: false,
            completed_at: None,
        };
        let now = Utc::now();
        milestone.set_completed(true, now);
        assert!(milestone.completed);
        assert_eq!(milestone.completed_at, Some(now));

        milestone.set_completed(false, now);
        assert!(!milestone.completed);
        assert!(milestone.completed_at.is_none());
    }

    #[test]
    fn test_targets_timeline_bounds() {
        let mut targets = FitnessTargets {
            primary_goal: PrimaryGoal::GeneralWellness,
            target_weight_kg: None,
            target_body_fat_percentage: None,
            target_muscle_mass_kg: None,
            mobility_goals: None,
            timeline_weeks: 520,
            weekly_activity_target: 3,
            specific_goals: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(targets.validate().is_ok());

        targets.timeline_weeks = 30_000_000;
        assert_eq!(
            targets.validate(),
            Err(ValidationError::TooLarge { field: "timeline_weeks", value: 30_000_000, max: 520 })
        );

        targets.timeline_weeks = 0;
        assert_eq!(targets.validate(), Err(ValidationError::NonPositive { field: "timeline_weeks" }));
    }

    #[test]
    fn test_activity_json_layout() {
        let activity = Activity {
            id: "1".to_string(),
            user_id: "u1".to_string(),
            exercise_type: "swimming".to_string(),
            duration: 30,
            intensity: Intensity::Low,
            mood: Mood::Good,
            notes: None,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&activity).unwrap();
        assert_eq!(value["intensity"], "low");
        assert_eq!(value["mood"], "good");
        assert!(value.get("notes").is_none());

        let back: Activity = serde_json::from_value(value).unwrap();
        assert_eq!(back, activity);
    }
}
