// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Fitness Tracker
//!
//! Per-user save and load flows over a [`KeyValueStore`]. The tracker owns no
//! state of its own: every call reads the documents it needs, applies the
//! rule engines and writes the result back.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::FitnessConfig;
use crate::database::{load_json, save_json, KeyValueStore, StorageError, StorageKey, StorageKind};
use crate::intelligence::{
    activities_this_week, average_mood, calculate_health_metrics, calculate_streak, current_plan_week,
    days_since_last_activity, filter_by_difficulty, gentle_nudge, mood_emoji, motivational_message,
    plan_progress, progress_insights, recommend_workouts, ActivityParser, HealthMetrics, ParsedActivity,
    PlanGenerator, PlanProgress,
};
use crate::logging::AppLogger;
use crate::models::{
    AccessibilityPreferences, Activity, BaselineData, DifficultyLevel, FitnessTargets, PersonalizedPlan,
    ProgressEntry, StreakData, UserProfile, ValidationError, Workout,
};

/// Tracker failures
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Invalid duration pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("No personalized plan exists yet; set a baseline and goals first")]
    NoPlan,

    #[error("Milestone index {index} is out of range (plan has {count} milestones)")]
    MilestoneOutOfRange { index: usize, count: usize },
}

/// Answers collected during onboarding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnboardingData {
    pub email: String,
    pub full_name: String,
    pub disability_type: Option<String>,
    pub mobility_notes: Option<String>,
    pub fitness_goals: Option<String>,
    pub accessibility_preferences: Option<AccessibilityPreferences>,
}

/// Everything stored for one user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    pub profile: Option<UserProfile>,
    /// Newest first
    pub activities: Vec<Activity>,
    pub baseline: Option<BaselineData>,
    pub targets: Option<FitnessTargets>,
    pub plan: Option<PersonalizedPlan>,
    /// Newest entry date first
    pub progress: Vec<ProgressEntry>,
}

impl UserState {
    pub fn needs_onboarding(&self) -> bool {
        self.profile.is_none()
    }
}

/// Summary figures and encouragement for the home screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub streak: StreakData,
    pub activities_this_week: usize,
    pub average_mood: Option<f64>,
    pub mood_emoji: Option<String>,
    pub days_since_last_activity: i64,
    pub plan_progress: Option<PlanProgress>,
    pub motivational_message: String,
    /// Empty when the user was active within the last day
    pub gentle_nudge: String,
    pub recent_activities: Vec<Activity>,
}

const RECENT_ACTIVITY_COUNT: usize = 5;

/// Save/load flows for a single user
pub struct FitnessTracker<S> {
    store: S,
    user_id: String,
    config: FitnessConfig,
    parser: ActivityParser,
}

impl<S: KeyValueStore> FitnessTracker<S> {
    pub fn new(store: S, user_id: impl Into<String>, config: FitnessConfig) -> Result<Self, TrackerError> {
        let parser = ActivityParser::new(&config.parser)?;
        Ok(Self {
            store,
            user_id: user_id.into(),
            config,
            parser,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn parser(&self) -> &ActivityParser {
        &self.parser
    }

    pub fn config(&self) -> &FitnessConfig {
        &self.config
    }

    fn key(&self, kind: StorageKind) -> StorageKey {
        StorageKey::new(kind, self.user_id.as_str())
    }

    async fn load<T: serde::de::DeserializeOwned>(&self, kind: StorageKind) -> Result<Option<T>, TrackerError> {
        Ok(load_json(&self.store, &self.key(kind)).await?)
    }

    async fn save<T: Serialize>(&self, kind: StorageKind, value: &T) -> Result<(), TrackerError> {
        Ok(save_json(&self.store, &self.key(kind), value).await?)
    }

    pub async fn profile(&self) -> Result<Option<UserProfile>, TrackerError> {
        self.load(StorageKind::Profile).await
    }

    pub async fn activities(&self) -> Result<Vec<Activity>, TrackerError> {
        Ok(self.load(StorageKind::Activities).await?.unwrap_or_default())
    }

    pub async fn baseline(&self) -> Result<Option<BaselineData>, TrackerError> {
        self.load(StorageKind::Baseline).await
    }

    pub async fn targets(&self) -> Result<Option<FitnessTargets>, TrackerError> {
        self.load(StorageKind::Targets).await
    }

    pub async fn plan(&self) -> Result<Option<PersonalizedPlan>, TrackerError> {
        self.load(StorageKind::Plan).await
    }

    pub async fn progress_entries(&self) -> Result<Vec<ProgressEntry>, TrackerError> {
        Ok(self.load(StorageKind::Progress).await?.unwrap_or_default())
    }

    /// Read every stored document for the user
    pub async fn load_state(&self) -> Result<UserState, TrackerError> {
        let state = UserState {
            profile: self.profile().await?,
            activities: self.activities().await?,
            baseline: self.baseline().await?,
            targets: self.targets().await?,
            plan: self.plan().await?,
            progress: self.progress_entries().await?,
        };

        debug!(
            user.id = %self.user_id,
            activities = state.activities.len(),
            progress_entries = state.progress.len(),
            has_plan = state.plan.is_some(),
            "Loaded user state"
        );
        Ok(state)
    }

    /// Write the profile built from onboarding answers
    pub async fn complete_onboarding(
        &self,
        data: OnboardingData,
        now: DateTime<Utc>,
    ) -> Result<UserProfile, TrackerError> {
        let profile = UserProfile {
            id: self.user_id.clone(),
            email: data.email,
            full_name: data.full_name,
            disability_type: data.disability_type.filter(|d| !d.trim().is_empty()),
            mobility_notes: data.mobility_notes,
            fitness_goals: data.fitness_goals,
            accessibility_preferences: data.accessibility_preferences,
            created_at: now,
        };
        self.save(StorageKind::Profile, &profile).await?;

        info!(user.id = %self.user_id, disability_type = ?profile.disability_type, "Onboarding completed");
        Ok(profile)
    }

    /// Parse free text and store the result as a new activity
    pub async fn log_activity_text(&self, text: &str, now: DateTime<Utc>) -> Result<Activity, TrackerError> {
        let parsed = self.parser.parse(text);
        self.save_activity(parsed, now).await
    }

    /// Prepend an activity to the user's list
    pub async fn save_activity(&self, parsed: ParsedActivity, now: DateTime<Utc>) -> Result<Activity, TrackerError> {
        let activity = parsed.into_activity(&self.user_id, now);

        let mut activities = self.activities().await?;
        activities.insert(0, activity.clone());
        self.save(StorageKind::Activities, &activities).await?;

        AppLogger::log_activity_logged(&self.user_id, &activity.exercise_type, activity.duration);
        Ok(activity)
    }

    /// Validate and store the baseline, keeping the first creation time
    pub async fn save_baseline(
        &self,
        mut baseline: BaselineData,
        now: DateTime<Utc>,
    ) -> Result<BaselineData, TrackerError> {
        baseline.validate()?;

        if let Some(existing) = self.baseline().await? {
            baseline.created_at = existing.created_at;
        }
        baseline.updated_at = now;
        self.save(StorageKind::Baseline, &baseline).await?;

        info!(user.id = %self.user_id, "Baseline assessment saved");
        Ok(baseline)
    }

    /// Store the targets. When a baseline exists the plan is regenerated and
    /// returned; otherwise no plan is written.
    pub async fn save_targets(
        &self,
        mut targets: FitnessTargets,
        now: DateTime<Utc>,
    ) -> Result<Option<PersonalizedPlan>, TrackerError> {
        targets.validate()?;

        if let Some(existing) = self.targets().await? {
            targets.created_at = existing.created_at;
        }
        targets.updated_at = now;
        self.save(StorageKind::Targets, &targets).await?;
        info!(user.id = %self.user_id, goal = %targets.primary_goal, "Fitness targets saved");

        let Some(baseline) = self.baseline().await? else {
            debug!(user.id = %self.user_id, "No baseline yet, plan not generated");
            return Ok(None);
        };

        let disability_type = self.profile().await?.and_then(|p| p.disability_type);
        let plan = PlanGenerator::new(&self.config.plans).generate_plan(
            &baseline,
            &targets,
            disability_type.as_deref(),
            &self.user_id,
            now,
        );
        self.save(StorageKind::Plan, &plan).await?;

        AppLogger::log_plan_generated(
            &self.user_id,
            plan.primary_goal.as_str(),
            plan.timeline_weeks,
            disability_type.as_deref(),
        );
        Ok(Some(plan))
    }

    /// Validate and insert a progress entry, keeping the list sorted by date
    pub async fn add_progress_entry(&self, mut entry: ProgressEntry) -> Result<ProgressEntry, TrackerError> {
        entry.validate()?;
        entry.user_id = self.user_id.clone();

        let mut entries = self.progress_entries().await?;
        // Newest first among entries sharing a date
        entries.insert(0, entry.clone());
        entries.sort_by(|a, b| b.entry_date.cmp(&a.entry_date));
        self.save(StorageKind::Progress, &entries).await?;

        info!(user.id = %self.user_id, entry_date = %entry.entry_date, "Progress entry added");
        Ok(entry)
    }

    /// Mark a plan milestone (un)completed
    pub async fn update_milestone(
        &self,
        index: usize,
        completed: bool,
        now: DateTime<Utc>,
    ) -> Result<PersonalizedPlan, TrackerError> {
        let mut plan = self.plan().await?.ok_or(TrackerError::NoPlan)?;

        let count = plan.milestones.len();
        let milestone = plan
            .milestones
            .get_mut(index)
            .ok_or(TrackerError::MilestoneOutOfRange { index, count })?;
        milestone.set_completed(completed, now);
        plan.updated_at = now;

        self.save(StorageKind::Plan, &plan).await?;
        AppLogger::log_milestone_update(&self.user_id, index, completed);
        Ok(plan)
    }

    /// BMI and insights from the stored baseline
    pub async fn health_metrics(&self) -> Result<Option<HealthMetrics>, TrackerError> {
        Ok(self.baseline().await?.as_ref().map(calculate_health_metrics))
    }

    /// Progress insights, `None` until a baseline exists
    pub async fn progress_insights(&self) -> Result<Option<Vec<String>>, TrackerError> {
        let Some(baseline) = self.baseline().await? else {
            return Ok(None);
        };
        let entries = self.progress_entries().await?;
        Ok(Some(progress_insights(&baseline, &entries)))
    }

    /// Catalog workouts for the profile's disability type
    pub async fn recommended_workouts(
        &self,
        difficulty: Option<DifficultyLevel>,
    ) -> Result<Vec<Workout>, TrackerError> {
        let disability_type = self.profile().await?.and_then(|p| p.disability_type);
        Ok(filter_by_difficulty(recommend_workouts(disability_type.as_deref()), difficulty))
    }

    /// Home-screen summary as of `now`
    pub async fn dashboard<R: Rng + ?Sized>(
        &self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Dashboard, TrackerError> {
        let activities = self.activities().await?;
        let plan = self.plan().await?;

        let streak = calculate_streak(&activities, now);
        let days_since = days_since_last_activity(&activities, now);
        let average = average_mood(&activities);
        let progress = plan
            .as_ref()
            .map(|p| plan_progress(p, current_plan_week(Some(p), now)));

        Ok(Dashboard {
            activities_this_week: activities_this_week(&activities, now),
            average_mood: average,
            mood_emoji: average.map(|a| mood_emoji(a).to_string()),
            days_since_last_activity: days_since,
            plan_progress: progress,
            motivational_message: motivational_message(rng, activities.len(), streak.current_streak),
            gentle_nudge: gentle_nudge(rng, days_since),
            recent_activities: activities.iter().take(RECENT_ACTIVITY_COUNT).cloned().collect(),
            streak,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::models::{MobilityLevel, Mood, PrimaryGoal, Sex};
    use chrono::{Duration, NaiveDate, TimeZone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, 10, 0, 0).unwrap()
    }

    fn tracker(store: MemoryStore) -> FitnessTracker<MemoryStore> {
        FitnessTracker::new(store, "user_test", FitnessConfig::default()).unwrap()
    }

    fn onboarding(disability: Option<&str>) -> OnboardingData {
        OnboardingData {
            email: "test@example.com".to_string(),
            full_name: "Test User".to_string(),
            disability_type: disability.map(str::to_string),
            ..OnboardingData::default()
        }
    }

    fn baseline() -> BaselineData {
        BaselineData {
            height_cm: 170.0,
            weight_kg: 80.0,
            age: 45,
            sex: Sex::Female,
            body_fat_percentage: None,
            muscle_mass_kg: None,
            resting_heart_rate: None,
            blood_pressure_systolic: None,
            blood_pressure_diastolic: None,
            mobility_level: MobilityLevel::Limited,
            pain_level: 7,
            energy_level: 4,
            current_medications: None,
            medical_conditions: None,
            previous_injuries: None,
            activity_limitations: None,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn targets(goal: PrimaryGoal) -> FitnessTargets {
        FitnessTargets {
            primary_goal: goal,
            target_weight_kg: Some(74.0),
            target_body_fat_percentage: None,
            target_muscle_mass_kg: None,
            mobility_goals: None,
            timeline_weeks: 12,
            weekly_activity_target: 4,
            specific_goals: None,
            created_at: now(),
            updated_at: now(),
        }
    }

    #[tokio::test]
    async fn test_onboarding_state() {
        let t = tracker(MemoryStore::new());
        assert!(t.load_state().await.unwrap().needs_onboarding());

        let profile = t.complete_onboarding(onboarding(Some("wheelchair")), now()).await.unwrap();
        assert_eq!(profile.id, "user_test");

        let state = t.load_state().await.unwrap();
        assert!(!state.needs_onboarding());
        assert_eq!(state.profile.unwrap().disability_type.as_deref(), Some("wheelchair"));
    }

    #[tokio::test]
    async fn test_activities_stored_newest_first() {
        let t = tracker(MemoryStore::new());
        t.log_activity_text("20 min walk", now() - Duration::days(1)).await.unwrap();
        let second = t.log_activity_text("swim for 1 hour, felt amazing", now()).await.unwrap();

        assert_eq!(second.duration, 60);
        assert_eq!(second.mood, Mood::Great);

        let activities = t.activities().await.unwrap();
        assert_eq!(activities.len(), 2);
        assert_eq!(activities[0].exercise_type, "swimming");
        assert_eq!(activities[1].exercise_type, "walking");
    }

    #[tokio::test]
    async fn test_targets_without_baseline_do_not_write_plan() {
        let t = tracker(MemoryStore::new());
        let plan = t.save_targets(targets(PrimaryGoal::WeightLoss), now()).await.unwrap();

        assert!(plan.is_none());
        assert!(t.plan().await.unwrap().is_none());
        assert!(t.targets().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_targets_regenerate_plan_with_disability_type() {
        let t = tracker(MemoryStore::new());
        t.complete_onboarding(onboarding(Some("chronic_pain")), now()).await.unwrap();
        t.save_baseline(baseline(), now()).await.unwrap();

        let first = t.save_targets(targets(PrimaryGoal::WeightLoss), now()).await.unwrap().unwrap();
        assert_eq!(first.timeline_weeks, 18);
        assert_eq!(first.plan_name, "Adaptive Weight Loss Journey");

        let second = t
            .save_targets(targets(PrimaryGoal::PainManagement), now() + Duration::days(1))
            .await
            .unwrap()
            .unwrap();
        assert_ne!(first.id, second.id);

        let stored = t.plan().await.unwrap().unwrap();
        assert_eq!(stored.plan_name, "Gentle Movement for Pain Relief");
        assert_eq!(stored.id, second.id);

        // Targets keep their first creation time
        let saved_targets = t.targets().await.unwrap().unwrap();
        assert_eq!(saved_targets.created_at, now());
        assert_eq!(saved_targets.updated_at, now() + Duration::days(1));
    }

    #[tokio::test]
    async fn test_baseline_validation_and_created_at() {
        let t = tracker(MemoryStore::new());

        let mut invalid = baseline();
        invalid.energy_level = 0;
        assert!(matches!(
            t.save_baseline(invalid, now()).await,
            Err(TrackerError::Validation(_))
        ));

        t.save_baseline(baseline(), now()).await.unwrap();
        let mut updated = baseline();
        updated.weight_kg = 78.0;
        updated.created_at = now() + Duration::days(3);
        let saved = t.save_baseline(updated, now() + Duration::days(3)).await.unwrap();

        assert_eq!(saved.created_at, now());
        assert_eq!(saved.weight_kg, 78.0);
    }

    #[tokio::test]
    async fn test_progress_entries_sorted_by_date() {
        let t = tracker(MemoryStore::new());
        for day in [3, 10, 1] {
            let date = NaiveDate::from_ymd_opt(2024, 5, day).unwrap();
            t.add_progress_entry(ProgressEntry::new("ignored", date, now())).await.unwrap();
        }

        let days: Vec<u32> = t
            .progress_entries()
            .await
            .unwrap()
            .iter()
            .map(|e| chrono::Datelike::day(&e.entry_date))
            .collect();
        assert_eq!(days, vec![10, 3, 1]);

        let mut bad = ProgressEntry::new("u", NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(), now());
        bad.pain_level = Some(11);
        assert!(t.add_progress_entry(bad).await.is_err());
    }

    #[tokio::test]
    async fn test_update_milestone() {
        let t = tracker(MemoryStore::new());
        assert!(matches!(t.update_milestone(0, true, now()).await, Err(TrackerError::NoPlan)));

        t.save_baseline(baseline(), now()).await.unwrap();
        t.save_targets(targets(PrimaryGoal::MuscleGain), now()).await.unwrap();

        let plan = t.update_milestone(1, true, now()).await.unwrap();
        assert!(plan.milestones[1].completed);
        assert_eq!(plan.milestones[1].completed_at, Some(now()));

        assert!(matches!(
            t.update_milestone(4, true, now()).await,
            Err(TrackerError::MilestoneOutOfRange { index: 4, count: 4 })
        ));

        let plan = t.update_milestone(1, false, now()).await.unwrap();
        assert!(!plan.milestones[1].completed);
        assert!(plan.milestones[1].completed_at.is_none());
    }

    #[tokio::test]
    async fn test_dashboard_summary() {
        let t = tracker(MemoryStore::new());
        let mut rng = StdRng::seed_from_u64(1);

        let empty = t.dashboard(now(), &mut rng).await.unwrap();
        assert_eq!(empty.streak.current_streak, 0);
        assert_eq!(empty.days_since_last_activity, 7);
        assert!(empty.average_mood.is_none());
        assert!(!empty.gentle_nudge.is_empty());
        assert!(empty.plan_progress.is_none());

        t.log_activity_text("gentle stretch, felt good", now() - Duration::days(1)).await.unwrap();
        t.log_activity_text("great pool session", now() - Duration::hours(2)).await.unwrap();

        let dashboard = t.dashboard(now(), &mut rng).await.unwrap();
        assert_eq!(dashboard.streak.current_streak, 2);
        assert_eq!(dashboard.streak.total_activities, 2);
        assert_eq!(dashboard.average_mood, Some(4.5));
        assert_eq!(dashboard.mood_emoji.as_deref(), Some("😊"));
        assert_eq!(dashboard.days_since_last_activity, 0);
        assert!(dashboard.gentle_nudge.is_empty());
        assert_eq!(dashboard.recent_activities.len(), 2);
    }

    #[tokio::test]
    async fn test_recommended_workouts_follow_profile() {
        let t = tracker(MemoryStore::new());
        let fallback = t.recommended_workouts(None).await.unwrap();
        assert_eq!(fallback[0].title, "Gentle Strength & Balance");

        t.complete_onboarding(onboarding(Some("wheelchair")), now()).await.unwrap();
        let workouts = t.recommended_workouts(None).await.unwrap();
        assert_eq!(workouts[0].title, "Upper Body Power Session");
        assert!(t
            .recommended_workouts(Some(DifficultyLevel::Beginner))
            .await
            .unwrap()
            .is_empty());
    }
}
