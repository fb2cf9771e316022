// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Rule tables for the activity parser and the plan generator
//!
//! Every "intelligence" rule lives here as data: keyword lists, timeline
//! multipliers, plan templates and milestone points. The embedded defaults
//! reproduce the stock behavior; a `fitness_config.toml` may override any
//! section.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::constants::defaults;
use crate::models::{Intensity, IntensityDistribution, Mood, PrimaryGoal, WeeklyTargets};

/// Main fitness configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessConfig {
    pub parser: ParserConfig,
    pub plans: PlanConfig,
}

/// A value selected when any of its keywords occurs in the input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule<T> {
    pub value: T,
    pub keywords: Vec<String>,
}

impl<T> KeywordRule<T> {
    fn new(value: T, keywords: &[&str]) -> Self {
        Self {
            value,
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
        }
    }

    /// True when any keyword is a substring of the lower-cased text.
    /// Keywords are compared lower-cased as well.
    pub fn matches(&self, text: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| text.contains(k.to_lowercase().as_str()))
    }
}

/// Keyword tables for free-text activity parsing. Rules are checked in order
/// and the first match wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Regex with the amount in group 1 and the unit in group 2
    pub duration_pattern: String,
    pub default_duration_minutes: u32,
    pub exercise_rules: Vec<KeywordRule<String>>,
    pub default_exercise_type: String,
    pub intensity_rules: Vec<KeywordRule<Intensity>>,
    pub default_intensity: Intensity,
    pub mood_rules: Vec<KeywordRule<Mood>>,
    pub default_mood: Mood,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            duration_pattern: r"(\d+)\s*(min|minute|minutes|hour|hours)".to_string(),
            default_duration_minutes: defaults::ACTIVITY_DURATION_MINUTES,
            exercise_rules: vec![
                KeywordRule::new("wheelchair mobility".to_string(), &["wheelchair", "rolling"]),
                KeywordRule::new("swimming".to_string(), &["swim", "pool"]),
                KeywordRule::new("physical therapy".to_string(), &["physical therapy", "pt"]),
                KeywordRule::new("stretching".to_string(), &["stretch", "yoga"]),
                KeywordRule::new("walking".to_string(), &["walk", "walking"]),
                KeywordRule::new("cardio".to_string(), &["cardio", "bike", "cycling"]),
                KeywordRule::new("strength training".to_string(), &["strength", "weight", "resistance"]),
            ],
            default_exercise_type: defaults::EXERCISE_TYPE.to_string(),
            intensity_rules: vec![
                KeywordRule::new(Intensity::Low, &["easy", "gentle", "light"]),
                KeywordRule::new(Intensity::High, &["hard", "intense", "challenging"]),
            ],
            default_intensity: Intensity::Moderate,
            mood_rules: vec![
                KeywordRule::new(Mood::Great, &["great", "amazing", "fantastic"]),
                KeywordRule::new(Mood::Good, &["good", "nice", "solid"]),
                KeywordRule::new(Mood::Tired, &["tired", "exhausted", "worn out"]),
                KeywordRule::new(Mood::Struggling, &["struggling", "difficult", "tough"]),
            ],
            default_mood: Mood::Okay,
        }
    }
}

/// Template a plan is built from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanTemplate {
    pub name: String,
    /// `{weeks}` is replaced with the adjusted timeline
    pub description: String,
    pub weekly_targets: WeeklyTargets,
    /// Cap sessions at the user's own weekly target
    #[serde(default)]
    pub cap_sessions_to_request: bool,
    pub recommendations: Vec<String>,
}

impl PlanTemplate {
    fn new(
        name: &str,
        description: &str,
        sessions: u32,
        minutes: u32,
        (low, moderate, high): (u8, u8, u8),
        recommendations: &[&str],
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            weekly_targets: WeeklyTargets {
                activity_sessions: sessions,
                total_minutes: minutes,
                intensity_distribution: IntensityDistribution { low, moderate, high },
            },
            cap_sessions_to_request: false,
            recommendations: recommendations.iter().map(|r| (*r).to_string()).collect(),
        }
    }
}

/// A milestone placed at a fraction of the adjusted timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneRule {
    pub fraction: f64,
    pub title: String,
}

/// Plan generation tables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Disability type -> timeline factor. Unlisted types use 1.0.
    pub timeline_multipliers: HashMap<String, f64>,
    /// Primary goal (snake_case) -> template
    pub templates: HashMap<String, PlanTemplate>,
    /// Used for goals without a dedicated template
    pub default_template: PlanTemplate,
    pub milestones: Vec<MilestoneRule>,
}

impl PlanConfig {
    /// Timeline factor for a disability type
    pub fn timeline_multiplier(&self, disability_type: Option<&str>) -> f64 {
        disability_type
            .and_then(|d| self.timeline_multipliers.get(d))
            .copied()
            .unwrap_or(1.0)
    }

    /// Template for a goal, falling back to the default template
    pub fn template_for(&self, goal: PrimaryGoal) -> &PlanTemplate {
        self.templates
            .get(goal.as_str())
            .unwrap_or(&self.default_template)
    }
}

impl Default for PlanConfig {
    fn default() -> Self {
        let mut timeline_multipliers = HashMap::new();
        timeline_multipliers.insert("chronic_pain".to_string(), 1.5);
        timeline_multipliers.insert("wheelchair".to_string(), 1.2);

        let mut weight_loss = PlanTemplate::new(
            "Adaptive Weight Loss Journey",
            "A {weeks}-week plan designed to help you lose weight safely while accommodating your mobility needs.",
            5,
            200,
            (40, 50, 10),
            &[
                "Focus on low-impact cardio exercises adapted to your abilities",
                "Combine movement with gentle strength training",
                "Monitor portion sizes and stay hydrated",
                "Track your mood and energy levels alongside weight",
                "Celebrate non-scale victories like improved mobility",
            ],
        );
        weight_loss.cap_sessions_to_request = true;

        let muscle_gain = PlanTemplate::new(
            "Adaptive Strength Building Program",
            "Build lean muscle mass over {weeks} weeks with exercises tailored to your physical capabilities.",
            4,
            180,
            (30, 50, 20),
            &[
                "Progressive resistance training using adaptive equipment",
                "Focus on compound movements when possible",
                "Ensure adequate protein intake for muscle recovery",
                "Allow proper rest between strength sessions",
                "Track strength improvements alongside muscle measurements",
            ],
        );

        let mobility = PlanTemplate::new(
            "Enhanced Mobility & Flexibility Plan",
            "Improve your range of motion and functional mobility over {weeks} weeks.",
            5,
            175,
            (70, 25, 5),
            &[
                "Daily gentle stretching and range-of-motion exercises",
                "Focus on functional movements for daily activities",
                "Use heat therapy before exercises when appropriate",
                "Track pain levels and adjust intensity accordingly",
                "Celebrate small improvements in daily tasks",
            ],
        );

        let pain = PlanTemplate::new(
            "Gentle Movement for Pain Relief",
            "A gentle {weeks}-week approach to managing pain through therapeutic movement.",
            4,
            120,
            (80, 15, 5),
            &[
                "Start with very gentle movements and progress slowly",
                "Focus on breathing and relaxation techniques",
                "Use warm water exercises when possible",
                "Track pain levels before and after activities",
                "Work with healthcare providers to adjust the plan",
            ],
        );

        let default_template = PlanTemplate::new(
            "Personalized Wellness Journey",
            "A comprehensive {weeks}-week plan for overall health and wellness.",
            3,
            150,
            (60, 30, 10),
            &[
                "Balance different types of activities throughout the week",
                "Listen to your body and adjust intensity as needed",
                "Focus on consistency over intensity",
                "Track multiple health metrics for a complete picture",
                "Celebrate all forms of progress, big and small",
            ],
        );

        let mut templates = HashMap::new();
        templates.insert(PrimaryGoal::WeightLoss.as_str().to_string(), weight_loss);
        templates.insert(PrimaryGoal::MuscleGain.as_str().to_string(), muscle_gain);
        templates.insert(PrimaryGoal::MobilityImprovement.as_str().to_string(), mobility);
        templates.insert(PrimaryGoal::PainManagement.as_str().to_string(), pain);

        let milestones = [
            (0.25, "First Quarter Check-in"),
            (0.5, "Halfway Point"),
            (0.75, "Three-Quarter Mark"),
            (1.0, "Goal Achievement"),
        ]
        .iter()
        .map(|(fraction, title)| MilestoneRule {
            fraction: *fraction,
            title: (*title).to_string(),
        })
        .collect();

        Self {
            timeline_multipliers,
            templates,
            default_template,
            milestones,
        }
    }
}

impl FitnessConfig {
    /// Load fitness configuration from file or use defaults
    pub fn load(path: Option<String>) -> Result<Self> {
        // Try explicit path first
        if let Some(config_path) = path {
            return Self::load_from_file(&config_path);
        }

        // Try default fitness config file
        if Path::new("fitness_config.toml").exists() {
            return Self::load_from_file("fitness_config.toml");
        }

        // Fall back to embedded defaults
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read fitness config file: {}", path))?;

        let config: FitnessConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse fitness config file: {}", path))?;

        Ok(config)
    }
}
