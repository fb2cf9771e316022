// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Insight and encouragement text
//!
//! Health and progress insights are deterministic. Motivational messages and
//! nudges pick a template at random; the caller supplies the RNG.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{BaselineData, MobilityLevel, ProgressEntry};

use super::metrics::progress_deltas;

const START_LOGGING: &str = "Start logging your progress to see personalized insights!";
const KEEP_LOGGING: &str = "Keep logging your progress to track improvements over time";

const GENTLE_NUDGES: [&str; 5] = [
    "💙 No pressure, but a gentle movement session might feel good today.",
    "🌱 Small steps lead to big changes. Even 5 minutes counts!",
    "☀️ Your body might be ready for some gentle activity. Listen to what feels right.",
    "🎯 Remember, consistency over intensity. A short session is still a win!",
    "💜 Taking care of yourself includes movement that feels good for you.",
];

/// Baseline observations: high pain, low energy, limited mobility
pub fn health_insights(baseline: &BaselineData) -> Vec<String> {
    let mut insights = Vec::new();

    if baseline.pain_level > 6 {
        insights.push("Consider focusing on gentle, low-impact activities to manage pain levels".to_string());
    }

    if baseline.energy_level < 4 {
        insights.push("Start with shorter, more frequent activity sessions to build energy".to_string());
    }

    if baseline.mobility_level == MobilityLevel::Limited {
        insights.push("Prioritize range-of-motion and flexibility exercises".to_string());
    }

    insights
}

/// Compare the newest progress entry against the baseline
pub fn progress_insights(baseline: &BaselineData, entries: &[ProgressEntry]) -> Vec<String> {
    let Some(delta) = progress_deltas(baseline, entries) else {
        return vec![START_LOGGING.to_string()];
    };

    let mut insights = Vec::new();

    if let Some(change) = delta.weight_change_kg {
        if change.abs() > 0.5 {
            let direction = if change > 0.0 { "gained" } else { "lost" };
            insights.push(format!(
                "You've {} {:.1}kg since starting your journey",
                direction,
                change.abs()
            ));
        }
    }

    if let Some(change) = delta.pain_change {
        if change > 1 {
            insights.push(format!("Great news! Your pain level has decreased by {change} points"));
        } else if change < -1 {
            insights.push("Your pain level has increased. Consider adjusting your activity intensity".to_string());
        }
    }

    if let Some(change) = delta.energy_change {
        if change > 1 {
            insights.push(format!("Your energy levels have improved by {change} points - keep it up!"));
        }
    }

    if let (Some(change), Some(score)) = (delta.mobility_change, entries.first().and_then(|e| e.mobility_score)) {
        if change > 0 {
            insights.push(format!("Your mobility has improved! Current score: {score}/10"));
        }
    }

    if insights.is_empty() {
        insights.push(KEEP_LOGGING.to_string());
    }

    insights
}

/// One of the encouragement templates, with the streak and activity count filled in
pub fn motivational_message<R: Rng + ?Sized>(rng: &mut R, total_activities: usize, streak: u32) -> String {
    let messages = [
        format!("🌟 {streak} days strong! Your consistency is building real strength and resilience."),
        format!("💪 You've logged {total_activities} activities this week. Every movement counts!"),
        "🎉 Your dedication to your health journey is truly inspiring. Keep moving forward!".to_string(),
        "✨ Progress isn't always linear, but you're showing up for yourself. That's what matters.".to_string(),
        format!("🏆 {streak}-day streak! You're proving that adaptive fitness is powerful fitness."),
    ];

    let index = rng.gen_range(0..messages.len());
    messages[index].clone()
}

/// A soft reminder after more than a day without activity, otherwise empty
pub fn gentle_nudge<R: Rng + ?Sized>(rng: &mut R, days_since_last_activity: i64) -> String {
    if days_since_last_activity <= 1 {
        return String::new();
    }

    GENTLE_NUDGES
        .choose(rng)
        .map(|nudge| (*nudge).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sex;
    use chrono::{NaiveDate, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn baseline(pain: u8, energy: u8, mobility: MobilityLevel) -> BaselineData {
        BaselineData {
            height_cm: 160.0,
            weight_kg: 70.0,
            age: 29,
            sex: Sex::Other,
            body_fat_percentage: None,
            muscle_mass_kg: None,
            resting_heart_rate: None,
            blood_pressure_systolic: None,
            blood_pressure_diastolic: None,
            mobility_level: mobility,
            pain_level: pain,
            energy_level: energy,
            current_medications: None,
            medical_conditions: None,
            previous_injuries: None,
            activity_limitations: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn entry() -> ProgressEntry {
        ProgressEntry::new("u1", NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), Utc::now())
    }

    #[test]
    fn test_health_insights_thresholds() {
        assert!(health_insights(&baseline(6, 4, MobilityLevel::Moderate)).is_empty());

        let all = health_insights(&baseline(7, 3, MobilityLevel::Limited));
        assert_eq!(all.len(), 3);
        assert!(all[0].contains("manage pain"));
        assert!(all[2].starts_with("Prioritize range-of-motion"));
    }

    #[test]
    fn test_progress_insights_without_entries() {
        let insights = progress_insights(&baseline(5, 5, MobilityLevel::Good), &[]);
        assert_eq!(insights, vec![START_LOGGING.to_string()]);
    }

    #[test]
    fn test_progress_insights_improvements() {
        let base = baseline(8, 3, MobilityLevel::Limited);
        let mut latest = entry();
        latest.weight_kg = Some(67.6);
        latest.pain_level = Some(5);
        latest.energy_level = Some(6);
        latest.mobility_score = Some(4);

        let insights = progress_insights(&base, &[latest]);
        assert_eq!(
            insights,
            vec![
                "You've lost 2.4kg since starting your journey".to_string(),
                "Great news! Your pain level has decreased by 3 points".to_string(),
                "Your energy levels have improved by 3 points - keep it up!".to_string(),
                "Your mobility has improved! Current score: 4/10".to_string(),
            ]
        );
    }

    #[test]
    fn test_progress_insights_regressions_and_fallback() {
        let base = baseline(3, 6, MobilityLevel::Excellent);

        let mut worse = entry();
        worse.pain_level = Some(6);
        worse.weight_kg = Some(71.0);
        assert_eq!(
            progress_insights(&base, &[worse]),
            vec![
                "You've gained 1.0kg since starting your journey".to_string(),
                "Your pain level has increased. Consider adjusting your activity intensity".to_string(),
            ]
        );

        let mut steady = entry();
        steady.weight_kg = Some(70.4);
        steady.mobility_score = Some(9);
        assert_eq!(progress_insights(&base, &[steady]), vec![KEEP_LOGGING.to_string()]);
    }

    #[test]
    fn test_motivational_message_templates() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let message = motivational_message(&mut rng, 12, 4);
            assert!(!message.is_empty());
            assert!(!message.contains('{'));
            if message.starts_with("💪") {
                assert!(message.contains("12 activities"));
            }
            if message.starts_with("🏆") {
                assert!(message.contains("4-day streak"));
            }
        }
    }

    #[test]
    fn test_gentle_nudge() {
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(gentle_nudge(&mut rng, 0), "");
        assert_eq!(gentle_nudge(&mut rng, 1), "");

        let nudge = gentle_nudge(&mut rng, 3);
        assert!(GENTLE_NUDGES.contains(&nudge.as_str()));
    }
}
