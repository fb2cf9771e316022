// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Adaptive workout catalog keyed by disability type

use crate::constants::defaults;
use crate::models::{DifficultyLevel, Exercise, Workout};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn exercise(
    name: &str,
    description: &str,
    duration_or_reps: &str,
    modifications: &[&str],
    safety_notes: &[&str],
) -> Exercise {
    Exercise {
        name: name.to_string(),
        description: description.to_string(),
        duration_or_reps: duration_or_reps.to_string(),
        modifications: strings(modifications),
        safety_notes: strings(safety_notes),
    }
}

fn wheelchair_workouts() -> Vec<Workout> {
    vec![Workout {
        id: "1".to_string(),
        title: "Upper Body Power Session".to_string(),
        description: "Build strength in shoulders, arms, and core with wheelchair-friendly exercises."
            .to_string(),
        exercises: vec![
            exercise(
                "Seated Shoulder Press",
                "Press resistance band or weights overhead while maintaining proper posture.",
                "3 sets of 12 reps",
                &["Use lighter resistance for beginners", "Unilateral option available"],
                &["Keep core engaged", "Don't arch back excessively"],
            ),
            exercise(
                "Wheelchair Boxing",
                "Shadow boxing movements to build cardio and coordination.",
                "3 minutes with 30-second breaks",
                &["Start with 1 minute intervals", "Add resistance bands for extra challenge"],
                &["Stay hydrated", "Watch for shoulder fatigue"],
            ),
        ],
        difficulty_level: DifficultyLevel::Intermediate,
        disability_adaptations: strings(&[
            "All exercises designed for seated position",
            "Focus on unilateral movements",
            "Core stability emphasis",
        ]),
        duration_minutes: 30,
        equipment_needed: strings(&["Resistance bands", "Light dumbbells"]),
    }]
}

fn mobility_aid_workouts() -> Vec<Workout> {
    vec![Workout {
        id: "2".to_string(),
        title: "Gentle Strength & Balance".to_string(),
        description: "Low-impact exercises focusing on stability and functional strength.".to_string(),
        exercises: vec![exercise(
            "Assisted Squats",
            "Squats with chair support for safety and stability.",
            "2 sets of 8-10 reps",
            &["Full chair sitting if needed", "Hold chair back for support"],
            &["Move slowly", "Keep feet flat on ground"],
        )],
        difficulty_level: DifficultyLevel::Beginner,
        disability_adaptations: strings(&[
            "Chair support available for all exercises",
            "No jumping or high impact",
            "Balance assistance",
        ]),
        duration_minutes: 20,
        equipment_needed: strings(&["Sturdy chair", "Light resistance bands"]),
    }]
}

fn chronic_pain_workouts() -> Vec<Workout> {
    vec![Workout {
        id: "3".to_string(),
        title: "Gentle Movement Therapy".to_string(),
        description: "Low-intensity exercises designed to manage pain and improve mobility.".to_string(),
        exercises: vec![exercise(
            "Gentle Neck Rolls",
            "Slow, controlled neck movements to release tension.",
            "5 rolls each direction",
            &["Stop if any pain occurs", "Smaller range of motion"],
            &["Never force movement", "Breathe deeply throughout"],
        )],
        difficulty_level: DifficultyLevel::Beginner,
        disability_adaptations: strings(&[
            "All movements optional",
            "Pain-responsive modifications",
            "Gentle stretching focus",
        ]),
        duration_minutes: 15,
        equipment_needed: strings(&["Yoga mat", "Pillow for support"]),
    }]
}

fn catalog_for(disability_type: &str) -> Option<Vec<Workout>> {
    match disability_type {
        "wheelchair" => Some(wheelchair_workouts()),
        "mobility_aid" => Some(mobility_aid_workouts()),
        "chronic_pain" => Some(chronic_pain_workouts()),
        _ => None,
    }
}

/// Workouts adapted to `disability_type`. Unknown or missing types get the
/// mobility aid list.
pub fn recommend_workouts(disability_type: Option<&str>) -> Vec<Workout> {
    disability_type
        .and_then(catalog_for)
        .or_else(|| catalog_for(defaults::WORKOUT_DISABILITY_TYPE))
        .unwrap_or_default()
}

/// Keep workouts at `difficulty`; `None` keeps everything
pub fn filter_by_difficulty(workouts: Vec<Workout>, difficulty: Option<DifficultyLevel>) -> Vec<Workout> {
    match difficulty {
        Some(level) => workouts
            .into_iter()
            .filter(|w| w.difficulty_level == level)
            .collect(),
        None => workouts,
    }
}
