// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use adaptive_fitness::auth::{build_provider, describe_auth_error};
use adaptive_fitness::config::AppConfig;
use adaptive_fitness::constants::defaults;
use adaptive_fitness::database::SqliteStore;
use adaptive_fitness::logging::LoggingConfig;
use adaptive_fitness::models::{
    AccessibilityPreferences, BaselineData, DifficultyLevel, FitnessTargets, MobilityLevel, PrimaryGoal,
    ProgressEntry, Sex,
};
use adaptive_fitness::tracker::{FitnessTracker, OnboardingData};
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

#[derive(Parser)]
#[command(name = "adaptfit")]
#[command(author, version, about = "Adaptive fitness tracker", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// User id to act as (overrides the configured user)
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Database URL (overrides the configured database)
    #[arg(long, global = true)]
    database: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Sign in and remember the user in the config file
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Complete onboarding for the current user
    Onboard {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// e.g. wheelchair, mobility_aid, chronic_pain
        #[arg(long)]
        disability_type: Option<String>,
        #[arg(long)]
        mobility_notes: Option<String>,
        #[arg(long)]
        goals: Option<String>,
        #[arg(long)]
        high_contrast: bool,
        #[arg(long)]
        large_text: bool,
        #[arg(long)]
        voice: bool,
    },

    /// Log an activity from a free-text description
    Log {
        /// e.g. "Did 20 minutes of wheelchair cardio, felt great"
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Record the baseline assessment
    Baseline {
        #[arg(long)]
        height_cm: f64,
        #[arg(long)]
        weight_kg: f64,
        #[arg(long)]
        age: u32,
        #[arg(long, default_value = "prefer_not_to_say")]
        sex: Sex,
        #[arg(long, default_value = "moderate")]
        mobility: MobilityLevel,
        /// 1-10
        #[arg(long)]
        pain: u8,
        /// 1-10
        #[arg(long)]
        energy: u8,
        #[arg(long)]
        body_fat: Option<f64>,
        #[arg(long)]
        resting_heart_rate: Option<u32>,
        #[arg(long)]
        limitations: Option<String>,
    },

    /// Set fitness goals (regenerates the plan when a baseline exists)
    Goals {
        #[arg(long)]
        goal: PrimaryGoal,
        #[arg(long, default_value_t = defaults::TIMELINE_WEEKS)]
        weeks: u32,
        #[arg(long, default_value_t = defaults::WEEKLY_SESSIONS)]
        sessions: u32,
        #[arg(long)]
        target_weight: Option<f64>,
        #[arg(long)]
        mobility_goals: Option<String>,
        #[arg(long)]
        specific_goals: Option<String>,
    },

    /// Show the personalized plan
    Plan,

    /// Mark a plan milestone complete (or undo it)
    Milestone {
        /// Zero-based milestone index
        index: usize,
        #[arg(long)]
        undo: bool,
    },

    /// Record or review progress entries
    Progress {
        #[command(subcommand)]
        action: ProgressAction,
    },

    /// Show workouts adapted to the user's disability type
    Workouts {
        #[arg(long)]
        difficulty: Option<DifficultyLevel>,
    },

    /// Show streaks, mood and plan progress
    Dashboard,
}

#[derive(Subcommand)]
enum ProgressAction {
    /// Add a progress entry
    Add {
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        weight_kg: Option<f64>,
        #[arg(long)]
        mobility: Option<u8>,
        #[arg(long)]
        pain: Option<u8>,
        #[arg(long)]
        energy: Option<u8>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// List entries and insights
    Show,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    LoggingConfig::from_env().init()?;

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.clone())?;
    if let Some(database) = &cli.database {
        config.database_url = database.clone();
    }
    info!("{}", config.summary());

    let store = SqliteStore::new(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    match cli.command {
        Commands::Signup { email, password } => {
            let provider = build_provider(&config.auth, store)?;
            match provider.sign_up(&email, &password).await {
                Ok(session) => println!("Account created for {} (user id {})", session.email, session.user_id),
                Err(e) => anyhow::bail!(describe_auth_error(&e.to_string())),
            }
        }
        Commands::Login { email, password } => {
            let provider = build_provider(&config.auth, store)?;
            let session = match provider.sign_in(&email, &password).await {
                Ok(session) => session,
                Err(e) => anyhow::bail!(describe_auth_error(&e.to_string())),
            };
            AppConfig::remember_user(cli.config.clone(), &session.user_id)?;
            println!("Signed in as {} (user id {})", session.email, session.user_id);
        }
        command => {
            let user_id = cli
                .user
                .or_else(|| config.user_id.clone())
                .context("No user selected; run `adaptfit login` or pass --user")?;
            let tracker = FitnessTracker::new(store, user_id, config.fitness_config()?)?;
            run_tracker_command(&tracker, command, cli.json).await?;
        }
    }

    Ok(())
}

async fn run_tracker_command(tracker: &FitnessTracker<SqliteStore>, command: Commands, json: bool) -> Result<()> {
    let now = Utc::now();

    match command {
        Commands::Onboard {
            name,
            email,
            disability_type,
            mobility_notes,
            goals,
            high_contrast,
            large_text,
            voice,
        } => {
            let preferences = AccessibilityPreferences {
                high_contrast,
                large_text,
                voice_enabled: voice,
            };
            let data = OnboardingData {
                email,
                full_name: name,
                disability_type,
                mobility_notes,
                fitness_goals: goals,
                accessibility_preferences: Some(preferences),
            };
            let profile = tracker.complete_onboarding(data, now).await?;
            if json {
                return print_json(&profile);
            }
            println!("Welcome, {}! Your profile is set up.", profile.full_name);
        }
        Commands::Log { text } => {
            let activity = tracker.log_activity_text(&text.join(" "), now).await?;
            if json {
                return print_json(&activity);
            }
            println!(
                "Logged {} for {} min ({} intensity, feeling {} {})",
                activity.exercise_type,
                activity.duration,
                activity.intensity,
                activity.mood,
                activity.mood.emoji()
            );
        }
        Commands::Baseline {
            height_cm,
            weight_kg,
            age,
            sex,
            mobility,
            pain,
            energy,
            body_fat,
            resting_heart_rate,
            limitations,
        } => {
            let baseline = BaselineData {
                height_cm,
                weight_kg,
                age,
                sex,
                body_fat_percentage: body_fat,
                muscle_mass_kg: None,
                resting_heart_rate,
                blood_pressure_systolic: None,
                blood_pressure_diastolic: None,
                mobility_level: mobility,
                pain_level: pain,
                energy_level: energy,
                current_medications: None,
                medical_conditions: None,
                previous_injuries: None,
                activity_limitations: limitations,
                created_at: now,
                updated_at: now,
            };
            tracker.save_baseline(baseline, now).await?;
            let metrics = tracker
                .health_metrics()
                .await?
                .context("Baseline was not stored")?;
            if json {
                return print_json(&metrics);
            }
            println!("BMI {:.1} ({})", metrics.bmi, metrics.bmi_category);
            for insight in &metrics.insights {
                println!("  - {insight}");
            }
        }
        Commands::Goals {
            goal,
            weeks,
            sessions,
            target_weight,
            mobility_goals,
            specific_goals,
        } => {
            let targets = FitnessTargets {
                primary_goal: goal,
                target_weight_kg: target_weight,
                target_body_fat_percentage: None,
                target_muscle_mass_kg: None,
                mobility_goals,
                timeline_weeks: weeks,
                weekly_activity_target: sessions,
                specific_goals,
                created_at: now,
                updated_at: now,
            };
            match tracker.save_targets(targets, now).await? {
                Some(plan) if json => return print_json(&plan),
                Some(plan) => println!("Generated \"{}\" ({} weeks)", plan.plan_name, plan.timeline_weeks),
                None => println!("Goals saved. Record a baseline to generate your plan."),
            }
        }
        Commands::Plan => {
            let state = tracker.load_state().await?;
            let plan = state.plan.context("No plan yet; record a baseline and set goals first")?;
            if json {
                return print_json(&plan);
            }
            let week = adaptive_fitness::intelligence::current_plan_week(Some(&plan), now);
            let progress = adaptive_fitness::intelligence::plan_progress(&plan, week);

            println!("{}", plan.plan_name);
            println!("{}", plan.description);
            println!(
                "Week {} of {} | {:.0}% complete ({:.0}% expected){}",
                week,
                plan.timeline_weeks,
                progress.completion_percent,
                progress.expected_percent,
                if progress.is_ahead { " | ahead of schedule!" } else { "" }
            );
            let dist = &plan.weekly_targets.intensity_distribution;
            println!(
                "Weekly: {} sessions, {} minutes ({}% low / {}% moderate / {}% high)",
                plan.weekly_targets.activity_sessions,
                plan.weekly_targets.total_minutes,
                dist.low,
                dist.moderate,
                dist.high
            );
            for (i, milestone) in plan.milestones.iter().enumerate() {
                let mark = if milestone.completed { "x" } else { " " };
                println!("  [{mark}] {i}: week {} - {}", milestone.week, milestone.title);
            }
            for recommendation in &plan.recommendations {
                println!("  * {recommendation}");
            }
        }
        Commands::Milestone { index, undo } => {
            let plan = tracker.update_milestone(index, !undo, now).await?;
            if json {
                return print_json(&plan.milestones);
            }
            let milestone = &plan.milestones[index];
            let state = if milestone.completed { "completed" } else { "reopened" };
            println!("Milestone \"{}\" {}", milestone.title, state);
        }
        Commands::Progress { action } => match action {
            ProgressAction::Add {
                date,
                weight_kg,
                mobility,
                pain,
                energy,
                notes,
            } => {
                let mut entry = ProgressEntry::new(tracker.user_id(), date.unwrap_or(now.date_naive()), now);
                entry.weight_kg = weight_kg;
                entry.mobility_score = mobility;
                entry.pain_level = pain;
                entry.energy_level = energy;
                entry.notes = notes;
                let entry = tracker.add_progress_entry(entry).await?;
                if json {
                    return print_json(&entry);
                }
                println!("Progress recorded for {}", entry.entry_date);
            }
            ProgressAction::Show => {
                let entries = tracker.progress_entries().await?;
                let insights = tracker.progress_insights().await?.unwrap_or_default();
                if json {
                    return print_json(&serde_json::json!({ "entries": entries, "insights": insights }));
                }
                for entry in &entries {
                    println!(
                        "{}: weight {} | pain {} | energy {} | mobility {}",
                        entry.entry_date,
                        entry.weight_kg.map_or("-".to_string(), |w| format!("{w:.1}kg")),
                        entry.pain_level.map_or("-".to_string(), |v| v.to_string()),
                        entry.energy_level.map_or("-".to_string(), |v| v.to_string()),
                        entry.mobility_score.map_or("-".to_string(), |v| v.to_string()),
                    );
                }
                for insight in &insights {
                    println!("  - {insight}");
                }
            }
        },
        Commands::Workouts { difficulty } => {
            let workouts = tracker.recommended_workouts(difficulty).await?;
            if json {
                return print_json(&workouts);
            }
            for workout in &workouts {
                println!(
                    "{} ({}, {} min)\n  {}",
                    workout.title, workout.difficulty_level, workout.duration_minutes, workout.description
                );
                for exercise in &workout.exercises {
                    println!("  - {}: {}", exercise.name, exercise.duration_or_reps);
                }
            }
        }
        Commands::Dashboard => {
            let dashboard = tracker.dashboard(now, &mut rand::thread_rng()).await?;
            if json {
                return print_json(&dashboard);
            }
            println!("{}", dashboard.motivational_message);
            if !dashboard.gentle_nudge.is_empty() {
                println!("{}", dashboard.gentle_nudge);
            }
            println!(
                "Streak {} days | {} this week | {} total | mood {}",
                dashboard.streak.current_streak,
                dashboard.activities_this_week,
                dashboard.streak.total_activities,
                dashboard.mood_emoji.as_deref().unwrap_or("-")
            );
            if let Some(progress) = &dashboard.plan_progress {
                println!(
                    "Plan week {}: {}/{} milestones",
                    progress.current_week, progress.completed_milestones, progress.total_milestones
                );
            }
            for activity in &dashboard.recent_activities {
                println!(
                    "  {} - {} min {} ({})",
                    activity.created_at.format("%Y-%m-%d"),
                    activity.duration,
                    activity.exercise_type,
                    activity.mood
                );
            }
        }
        Commands::Signup { .. } | Commands::Login { .. } => {
            anyhow::bail!("Account commands are handled before a user is selected")
        }
    }

    Ok(())
}
