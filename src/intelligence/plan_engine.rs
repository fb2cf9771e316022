// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Rule-based personalized plan generation
//!
//! A plan is a pure function of the baseline, the targets and the user's
//! disability type: the goal selects a [`PlanTemplate`], the disability type
//! stretches the timeline, and milestones are placed at fixed fractions of the
//! stretched timeline.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::config::fitness_config::{PlanConfig, PlanTemplate};
use crate::models::{
    BaselineData, FitnessTargets, PersonalizedPlan, PlanMilestone, PrimaryGoal, TargetMetrics,
    WeeklyTargets,
};

/// Generates plans from the configured rule tables
pub struct PlanGenerator<'a> {
    config: &'a PlanConfig,
}

impl<'a> PlanGenerator<'a> {
    pub fn new(config: &'a PlanConfig) -> Self {
        Self { config }
    }

    /// Requested weeks scaled by the disability factor, rounded up
    pub fn adjusted_timeline(&self, timeline_weeks: u32, disability_type: Option<&str>) -> u32 {
        let multiplier = self.config.timeline_multiplier(disability_type);
        (f64::from(timeline_weeks) * multiplier).ceil() as u32
    }

    fn weekly_targets(template: &PlanTemplate, targets: &FitnessTargets) -> WeeklyTargets {
        let mut weekly = template.weekly_targets.clone();
        if template.cap_sessions_to_request {
            weekly.activity_sessions = weekly.activity_sessions.min(targets.weekly_activity_target);
        }
        weekly
    }

    /// Milestones at the configured fractions of `total_weeks`
    pub fn milestones(
        &self,
        baseline: &BaselineData,
        targets: &FitnessTargets,
        weekly: &WeeklyTargets,
        total_weeks: u32,
    ) -> Vec<PlanMilestone> {
        self.config
            .milestones
            .iter()
            .map(|rule| {
                let week = (f64::from(total_weeks) * rule.fraction).floor() as u32;
                let progress = if total_weeks == 0 {
                    0.0
                } else {
                    f64::from(week) / f64::from(total_weeks)
                };

                let target_metrics = TargetMetrics {
                    weight_change_kg: targets
                        .target_weight_kg
                        .map(|target| (target - baseline.weight_kg) * progress),
                    activity_minutes: Some(weekly.total_minutes.saturating_mul(week)),
                    mobility_improvement: (targets.primary_goal == PrimaryGoal::MobilityImprovement)
                        .then(|| format!("{}% improvement target", (progress * 100.0).floor() as u32)),
                };

                PlanMilestone {
                    week,
                    title: rule.title.clone(),
                    description: format!("Review progress and adjust plan as needed at week {week}"),
                    target_metrics,
                    completed: false,
                    completed_at: None,
                }
            })
            .collect()
    }

    /// Build a fresh plan. Total: never fails for validated inputs.
    pub fn generate_plan(
        &self,
        baseline: &BaselineData,
        targets: &FitnessTargets,
        disability_type: Option<&str>,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> PersonalizedPlan {
        let timeline_weeks = self.adjusted_timeline(targets.timeline_weeks, disability_type);
        let template = self.config.template_for(targets.primary_goal);
        let weekly_targets = Self::weekly_targets(template, targets);
        let milestones = self.milestones(baseline, targets, &weekly_targets, timeline_weeks);

        debug!(
            goal = %targets.primary_goal,
            requested_weeks = targets.timeline_weeks,
            adjusted_weeks = timeline_weeks,
            template = %template.name,
            "Generated plan from template"
        );

        PersonalizedPlan {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            plan_name: template.name.clone(),
            description: template.description.replace("{weeks}", &timeline_weeks.to_string()),
            primary_goal: targets.primary_goal,
            timeline_weeks,
            weekly_targets,
            milestones,
            recommendations: template.recommendations.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FitnessConfig;
    use crate::intelligence::metrics::{current_plan_week, plan_progress};
    use crate::models::{MobilityLevel, Sex};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap()
    }

    fn baseline() -> BaselineData {
        BaselineData {
            height_cm: 165.0,
            weight_kg: 90.0,
            age: 52,
            sex: Sex::Male,
            body_fat_percentage: None,
            muscle_mass_kg: None,
            resting_heart_rate: Some(72),
            blood_pressure_systolic: None,
            blood_pressure_diastolic: None,
            mobility_level: MobilityLevel::Limited,
            pain_level: 6,
            energy_level: 5,
            current_medications: None,
            medical_conditions: None,
            previous_injuries: None,
            activity_limitations: None,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn targets(goal: PrimaryGoal, weeks: u32, sessions: u32) -> FitnessTargets {
        FitnessTargets {
            primary_goal: goal,
            target_weight_kg: None,
            target_body_fat_percentage: None,
            target_muscle_mass_kg: None,
            mobility_goals: None,
            timeline_weeks: weeks,
            weekly_activity_target: sessions,
            specific_goals: None,
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn test_timeline_adjustment() {
        let config = FitnessConfig::default();
        let generator = PlanGenerator::new(&config.plans);

        assert_eq!(generator.adjusted_timeline(12, Some("chronic_pain")), 18);
        assert_eq!(generator.adjusted_timeline(12, Some("wheelchair")), 15); // 14.4 rounded up
        assert_eq!(generator.adjusted_timeline(12, Some("hearing")), 12);
        assert_eq!(generator.adjusted_timeline(12, None), 12);
    }

    #[test]
    fn test_weight_loss_plan_for_wheelchair_user() {
        let config = FitnessConfig::default();
        let generator = PlanGenerator::new(&config.plans);
        let mut goal = targets(PrimaryGoal::WeightLoss, 10, 3);
        goal.target_weight_kg = Some(84.0);

        let plan = generator.generate_plan(&baseline(), &goal, Some("wheelchair"), "user_1", now());

        assert_eq!(plan.plan_name, "Adaptive Weight Loss Journey");
        assert_eq!(plan.timeline_weeks, 12);
        assert!(plan.description.starts_with("A 12-week plan"));
        assert_eq!(plan.weekly_targets.activity_sessions, 3);
        assert_eq!(plan.weekly_targets.total_minutes, 200);
        assert_eq!(plan.weekly_targets.intensity_distribution.moderate, 50);
        assert_eq!(plan.recommendations.len(), 5);
        assert_eq!(plan.user_id, "user_1");

        let weeks: Vec<u32> = plan.milestones.iter().map(|m| m.week).collect();
        assert_eq!(weeks, vec![3, 6, 9, 12]);

        let first = &plan.milestones[0];
        assert_eq!(first.title, "First Quarter Check-in");
        assert_eq!(first.description, "Review progress and adjust plan as needed at week 3");
        assert_eq!(first.target_metrics.activity_minutes, Some(600));
        assert_eq!(first.target_metrics.weight_change_kg, Some(-1.5));
        assert!(first.target_metrics.mobility_improvement.is_none());
        assert!(plan.milestones.iter().all(|m| !m.completed));
    }

    #[test]
    fn test_unvalidated_long_timeline_saturates_minutes() {
        let config = FitnessConfig::default();
        let generator = PlanGenerator::new(&config.plans);
        let plan = generator.generate_plan(
            &baseline(),
            &targets(PrimaryGoal::WeightLoss, 30_000_000, 3),
            None,
            "user_1",
            now(),
        );

        assert_eq!(plan.milestones[0].target_metrics.activity_minutes, Some(1_500_000_000));
        assert_eq!(plan.milestones[3].target_metrics.activity_minutes, Some(u32::MAX));
    }

    #[test]
    fn test_weight_loss_sessions_capped_at_five() {
        let config = FitnessConfig::default();
        let generator = PlanGenerator::new(&config.plans);
        let plan = generator.generate_plan(
            &baseline(),
            &targets(PrimaryGoal::WeightLoss, 8, 7),
            None,
            "user_1",
            now(),
        );
        assert_eq!(plan.weekly_targets.activity_sessions, 5);
    }

    #[test]
    fn test_mobility_milestones_for_chronic_pain() {
        let config = FitnessConfig::default();
        let generator = PlanGenerator::new(&config.plans);
        let plan = generator.generate_plan(
            &baseline(),
            &targets(PrimaryGoal::MobilityImprovement, 7, 3),
            Some("chronic_pain"),
            "user_1",
            now(),
        );

        // ceil(7 * 1.5) = 11
        assert_eq!(plan.timeline_weeks, 11);
        let weeks: Vec<u32> = plan.milestones.iter().map(|m| m.week).collect();
        assert_eq!(weeks, vec![2, 5, 8, 11]);

        let improvements: Vec<&str> = plan
            .milestones
            .iter()
            .filter_map(|m| m.target_metrics.mobility_improvement.as_deref())
            .collect();
        assert_eq!(
            improvements,
            vec![
                "18% improvement target",
                "45% improvement target",
                "72% improvement target",
                "100% improvement target"
            ]
        );
        assert!(plan.milestones.iter().all(|m| m.target_metrics.weight_change_kg.is_none()));
    }

    #[test]
    fn test_unlisted_goal_uses_default_template() {
        let config = FitnessConfig::default();
        let generator = PlanGenerator::new(&config.plans);
        let plan = generator.generate_plan(
            &baseline(),
            &targets(PrimaryGoal::EnduranceBuilding, 4, 3),
            None,
            "user_1",
            now(),
        );

        assert_eq!(plan.plan_name, "Personalized Wellness Journey");
        assert_eq!(plan.weekly_targets.activity_sessions, 3);
        assert_eq!(plan.weekly_targets.total_minutes, 150);
        assert_eq!(plan.milestones.len(), 4);
        assert_eq!(plan.milestones[0].week, 1);
    }

    #[test]
    fn test_milestone_count_across_timelines() {
        let config = FitnessConfig::default();
        let generator = PlanGenerator::new(&config.plans);

        for weeks in 1..=52 {
            let plan = generator.generate_plan(
                &baseline(),
                &targets(PrimaryGoal::PainManagement, weeks, 3),
                None,
                "user_1",
                now(),
            );
            assert_eq!(plan.milestones.len(), 4);
            assert_eq!(plan.milestones[1].week, weeks / 2);
            assert_eq!(plan.milestones[3].week, weeks);
        }
    }

    #[test]
    fn test_plan_progress_tracking() {
        let config = FitnessConfig::default();
        let generator = PlanGenerator::new(&config.plans);
        let mut plan = generator.generate_plan(
            &baseline(),
            &targets(PrimaryGoal::MuscleGain, 8, 4),
            None,
            "user_1",
            now(),
        );

        assert_eq!(current_plan_week(None, now()), 1);
        assert_eq!(current_plan_week(Some(&plan), now()), 0);
        assert_eq!(current_plan_week(Some(&plan), now() + Duration::days(10)), 2);
        assert_eq!(current_plan_week(Some(&plan), now() + Duration::days(400)), 8);

        plan.milestones[0].set_completed(true, now());
        plan.milestones[1].set_completed(true, now());

        let progress = plan_progress(&plan, 2);
        assert_eq!(progress.completed_milestones, 2);
        assert_eq!(progress.completion_percent, 50.0);
        assert_eq!(progress.expected_percent, 25.0);
        assert!(progress.is_ahead);

        let behind = plan_progress(&plan, 6);
        assert!(!behind.is_ahead);
    }
}
