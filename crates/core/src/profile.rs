//! Cognitive profile of the user a breakdown is generated for.
//!
//! [`ProfileInput`] is the loosely-typed shape received from clients;
//! [`UserProfile`] is the validated form every other module consumes.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Allowed break interval, in minutes.
pub const BREAK_INTERVAL_RANGE: RangeInclusive<i32> = 5..=120;

/// Allowed response verbosity level.
pub const VERBOSITY_RANGE: RangeInclusive<i32> = 1..=5;

// ---------------------------------------------------------------------------
// Neurodivergence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Neurodivergence {
    Adhd,
    Dyslexia,
    Autism,
}

impl Neurodivergence {
    pub const ALL: [Neurodivergence; 3] = [Self::Adhd, Self::Dyslexia, Self::Autism];

    /// Storage / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Adhd => "adhd",
            Self::Dyslexia => "dyslexia",
            Self::Autism => "autism",
        }
    }

    /// Human-readable label used inside prompts.
    pub fn label(self) -> &'static str {
        match self {
            Self::Adhd => "ADHD",
            Self::Dyslexia => "dyslexia",
            Self::Autism => "autism",
        }
    }
}

impl fmt::Display for Neurodivergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Neurodivergence {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|n| n.as_str() == normalized)
            .ok_or_else(|| {
                CoreError::InvalidInput(format!(
                    "Unknown neurodivergence '{s}'. Must be one of: adhd, dyslexia, autism"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Step granularity
// ---------------------------------------------------------------------------

/// Requested step-count density of a breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepGranularity {
    Micro,
    Normal,
    Macro,
}

impl StepGranularity {
    pub const ALL: [StepGranularity; 3] = [Self::Micro, Self::Normal, Self::Macro];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Micro => "micro",
            Self::Normal => "normal",
            Self::Macro => "macro",
        }
    }

    /// Inclusive range of step counts an accepted breakdown must fall in.
    pub fn step_range(self) -> RangeInclusive<usize> {
        match self {
            Self::Micro => 8..=10,
            Self::Normal => 6..=8,
            Self::Macro => 4..=6,
        }
    }
}

impl fmt::Display for StepGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepGranularity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == normalized)
            .ok_or_else(|| {
                CoreError::InvalidInput(format!(
                    "Unknown step granularity '{s}'. Must be one of: micro, normal, macro"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Validated cognitive and behavioural preferences of one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub neurodivergence: Neurodivergence,
    pub break_interval_minutes: i32,
    pub fatigue_triggers: Vec<String>,
    pub tones: Vec<String>,
    pub verbosity: i32,
    pub step_granularity: StepGranularity,
}

impl UserProfile {
    /// Check the bounded fields. Enumerations are already enforced by type.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !BREAK_INTERVAL_RANGE.contains(&self.break_interval_minutes) {
            return Err(CoreError::InvalidInput(format!(
                "break_interval_minutes must be between {} and {}, got {}",
                BREAK_INTERVAL_RANGE.start(),
                BREAK_INTERVAL_RANGE.end(),
                self.break_interval_minutes
            )));
        }
        if !VERBOSITY_RANGE.contains(&self.verbosity) {
            return Err(CoreError::InvalidInput(format!(
                "verbosity must be between {} and {}, got {}",
                VERBOSITY_RANGE.start(),
                VERBOSITY_RANGE.end(),
                self.verbosity
            )));
        }
        if self.tones.iter().all(|t| t.trim().is_empty()) {
            return Err(CoreError::InvalidInput(
                "At least one tone label is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Profile as submitted by a client, before any validation.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileInput {
    pub neurodivergence: String,
    pub break_interval_minutes: i32,
    #[serde(default)]
    pub fatigue_triggers: Vec<String>,
    pub tones: Vec<String>,
    pub verbosity: i32,
    pub step_granularity: String,
}

impl TryFrom<ProfileInput> for UserProfile {
    type Error = CoreError;

    fn try_from(input: ProfileInput) -> Result<Self, Self::Error> {
        let profile = UserProfile {
            neurodivergence: input.neurodivergence.parse()?,
            break_interval_minutes: input.break_interval_minutes,
            fatigue_triggers: clean_labels(input.fatigue_triggers),
            tones: clean_labels(input.tones),
            verbosity: input.verbosity,
            step_granularity: input.step_granularity.parse()?,
        };
        profile.validate()?;
        Ok(profile)
    }
}

/// Trim labels and drop empty ones, keeping first-seen order.
fn clean_labels(labels: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let label = label.trim();
        if !label.is_empty() && !cleaned.iter().any(|l| l == label) {
            cleaned.push(label.to_string());
        }
    }
    cleaned
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn input() -> ProfileInput {
        ProfileInput {
            neurodivergence: "ADHD".to_string(),
            break_interval_minutes: 25,
            fatigue_triggers: vec![" noise ".to_string(), "".to_string()],
            tones: vec!["calm".to_string(), "calm".to_string()],
            verbosity: 3,
            step_granularity: "Normal".to_string(),
        }
    }

    #[test]
    fn valid_input_converts() {
        let profile = UserProfile::try_from(input()).unwrap();
        assert_eq!(profile.neurodivergence, Neurodivergence::Adhd);
        assert_eq!(profile.step_granularity, StepGranularity::Normal);
        assert_eq!(profile.fatigue_triggers, vec!["noise".to_string()]);
        assert_eq!(profile.tones, vec!["calm".to_string()]);
    }

    #[test]
    fn unknown_granularity_is_invalid_input() {
        let mut bad = input();
        bad.step_granularity = "huge".to_string();
        assert_matches!(UserProfile::try_from(bad), Err(CoreError::InvalidInput(_)));
    }

    #[test]
    fn unknown_neurodivergence_is_invalid_input() {
        let mut bad = input();
        bad.neurodivergence = "other".to_string();
        assert_matches!(UserProfile::try_from(bad), Err(CoreError::InvalidInput(_)));
    }

    #[test]
    fn break_interval_bounds() {
        for (minutes, ok) in [(4, false), (5, true), (120, true), (121, false)] {
            let mut candidate = input();
            candidate.break_interval_minutes = minutes;
            assert_eq!(UserProfile::try_from(candidate).is_ok(), ok, "{minutes}");
        }
    }

    #[test]
    fn verbosity_bounds() {
        for (level, ok) in [(0, false), (1, true), (5, true), (6, false)] {
            let mut candidate = input();
            candidate.verbosity = level;
            assert_eq!(UserProfile::try_from(candidate).is_ok(), ok, "{level}");
        }
    }

    #[test]
    fn tones_are_required() {
        let mut bad = input();
        bad.tones = vec!["  ".to_string()];
        assert_matches!(UserProfile::try_from(bad), Err(CoreError::InvalidInput(_)));
    }

    #[test]
    fn granularity_step_ranges() {
        assert_eq!(StepGranularity::Micro.step_range(), 8..=10);
        assert_eq!(StepGranularity::Normal.step_range(), 6..=8);
        assert_eq!(StepGranularity::Macro.step_range(), 4..=6);
    }
}
