// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Keyword-based parsing of free-text activity descriptions
//!
//! "Did 20 minutes of wheelchair cardio, felt great" becomes a
//! [`ParsedActivity`] with a duration, an exercise type, an intensity and a
//! mood. Matching is case-insensitive substring lookup against the ordered
//! rule tables in [`ParserConfig`]; the first matching rule wins.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::fitness_config::{KeywordRule, ParserConfig};
use crate::models::{Activity, Intensity, Mood};

/// Fields recovered from a free-text description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedActivity {
    pub exercise_type: String,
    /// Minutes
    pub duration: u32,
    pub intensity: Intensity,
    pub mood: Mood,
    /// The raw input text, unmodified
    pub notes: String,
}

impl ParsedActivity {
    /// Turn the parsed fields into a stored activity with a fresh id
    pub fn into_activity(self, user_id: &str, now: DateTime<Utc>) -> Activity {
        Activity {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            exercise_type: self.exercise_type,
            duration: self.duration,
            intensity: self.intensity,
            mood: self.mood,
            notes: Some(self.notes),
            created_at: now,
        }
    }
}

/// Free-text activity parser
#[derive(Debug, Clone)]
pub struct ActivityParser {
    config: ParserConfig,
    duration_pattern: Regex,
}

fn first_match<T: Clone>(rules: &[KeywordRule<T>], text: &str) -> Option<T> {
    rules.iter().find(|rule| rule.matches(text)).map(|rule| rule.value.clone())
}

impl ActivityParser {
    /// Compile the duration pattern of `config`
    pub fn new(config: &ParserConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            duration_pattern: Regex::new(&config.duration_pattern)?,
            config: config.clone(),
        })
    }

    pub fn parse(&self, input: &str) -> ParsedActivity {
        let text = input.to_lowercase();

        let exercise_type = first_match(&self.config.exercise_rules, &text)
            .unwrap_or_else(|| self.config.default_exercise_type.clone());
        let intensity =
            first_match(&self.config.intensity_rules, &text).unwrap_or(self.config.default_intensity);
        let mood = first_match(&self.config.mood_rules, &text).unwrap_or(self.config.default_mood);
        let duration = self.extract_duration(&text);

        debug!(
            exercise_type = %exercise_type,
            duration,
            intensity = %intensity,
            mood = %mood,
            "Parsed activity text"
        );

        ParsedActivity {
            exercise_type,
            duration,
            intensity,
            mood,
            notes: input.to_string(),
        }
    }

    /// Minutes from the first duration phrase. Zero, unparseable or missing
    /// durations fall back to the configured default.
    fn extract_duration(&self, text: &str) -> u32 {
        let minutes = self.duration_pattern.captures(text).and_then(|caps| {
            let amount: u32 = caps.get(1)?.as_str().parse().ok()?;
            let unit = caps.get(2).map_or("", |m| m.as_str());
            if unit.starts_with("hour") {
                amount.checked_mul(60)
            } else {
                Some(amount)
            }
        });

        match minutes {
            Some(m) if m > 0 => m,
            _ => self.config.default_duration_minutes,
        }
    }
}
