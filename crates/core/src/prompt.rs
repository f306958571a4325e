//! Instruction templates sent to the language model.
//!
//! Output depends only on the inputs; the same mode and description always
//! produce byte-identical prompts.

use std::fmt::Write;

use crate::breakdown::{BreakdownMode, MAX_STEP_MINUTES, MAX_STEP_WORDS, MIN_STEP_MINUTES, OUTPUT_SCHEMA};
use crate::profile::{Neurodivergence, StepGranularity, UserProfile};

/// Render the prompt for `mode`. `task_description` should already be redacted.
pub fn build_prompt(mode: &BreakdownMode, task_description: &str) -> String {
    match mode {
        BreakdownMode::Profile(profile) => profile_prompt(profile, task_description),
        BreakdownMode::Minimal { granularity } => minimal_prompt(*granularity, task_description),
    }
}

pub fn neurodivergence_guidance(neurodivergence: Neurodivergence) -> &'static str {
    match neurodivergence {
        Neurodivergence::Adhd => {
            "Make every transition explicit: each step says exactly what to start and when it is finished."
        }
        Neurodivergence::Dyslexia => {
            "Use short, plain sentences with common words. Avoid dense or ambiguous wording."
        }
        Neurodivergence::Autism => {
            "Keep a predictable, fixed structure. State clear expectations and avoid vague instructions."
        }
    }
}

/// Guidance for one tone label. Unknown labels are passed through as-is.
pub fn tone_guidance(tone: &str) -> String {
    match tone.to_ascii_lowercase().as_str() {
        "calm" => "calm: gentle, reassuring language".to_string(),
        "friendly" => "friendly: upbeat, warm language".to_string(),
        "strict" => "strict: direct, no-nonsense language".to_string(),
        _ => tone.to_string(),
    }
}

pub fn verbosity_guidance(verbosity: i32) -> &'static str {
    match verbosity {
        ..=2 => "Minimal: the bare action only.",
        3 => "Balanced: the action with a brief clarification where needed.",
        _ => "Detailed: the action with enough context to do it without guessing.",
    }
}

fn granularity_table() -> String {
    let mut table = String::new();
    for granularity in StepGranularity::ALL {
        let range = granularity.step_range();
        let _ = writeln!(table, "- {granularity}: {}-{} steps", range.start(), range.end());
    }
    table
}

fn step_rules(granularity: StepGranularity) -> String {
    let range = granularity.step_range();
    format!(
        "RULES:\n\
         - Produce between {} and {} steps (granularity: {granularity}).\n\
         - One action per step. No compound sentences.\n\
         - At most {MAX_STEP_WORDS} words per step.\n\
         - Each step takes {MIN_STEP_MINUTES} to {MAX_STEP_MINUTES} minutes.\n\
         - No motivational language. No medical language or advice.\n",
        range.start(),
        range.end(),
    )
}

fn profile_prompt(profile: &UserProfile, task_description: &str) -> String {
    let triggers = if profile.fatigue_triggers.is_empty() {
        "none".to_string()
    } else {
        profile.fatigue_triggers.join(", ")
    };
    let tones: Vec<String> = profile.tones.iter().map(|t| tone_guidance(t)).collect();

    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "You are a productivity assistant that breaks tasks into small steps for a person with {}.",
        profile.neurodivergence.label()
    );
    prompt.push('\n');
    prompt.push_str("USER PROFILE:\n");
    let _ = writeln!(prompt, "- Neurodivergence: {}", profile.neurodivergence.label());
    let _ = writeln!(prompt, "- Break interval: every {} minutes", profile.break_interval_minutes);
    let _ = writeln!(prompt, "- Fatigue triggers to avoid: {triggers}");
    let _ = writeln!(prompt, "- Tone: {}", profile.tones.join(", "));
    let _ = writeln!(prompt, "- Verbosity: {}/5", profile.verbosity);
    let _ = writeln!(prompt, "- Step granularity: {}", profile.step_granularity);
    prompt.push('\n');
    prompt.push_str("TASK:\n");
    prompt.push_str(task_description);
    prompt.push_str("\n\n");
    prompt.push_str("STEP COUNT BY GRANULARITY:\n");
    prompt.push_str(&granularity_table());
    prompt.push('\n');
    prompt.push_str(&step_rules(profile.step_granularity));
    prompt.push('\n');
    prompt.push_str("ADAPTATIONS:\n");
    let _ = writeln!(prompt, "- {}", neurodivergence_guidance(profile.neurodivergence));
    let _ = writeln!(prompt, "- Tone: {}.", tones.join("; "));
    let _ = writeln!(prompt, "- Verbosity: {}", verbosity_guidance(profile.verbosity));
    let _ = writeln!(prompt, "- Avoid steps that involve: {triggers}.");
    let _ = writeln!(
        prompt,
        "- Plan for a break every {} minutes; do not schedule one inside a step.",
        profile.break_interval_minutes
    );
    prompt.push('\n');
    prompt.push_str(OUTPUT_SCHEMA);
    prompt
}

fn minimal_prompt(granularity: StepGranularity, task_description: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str("Break the task below into small sequential steps.\n\n");
    prompt.push_str("TASK:\n");
    prompt.push_str(task_description);
    prompt.push_str("\n\n");
    prompt.push_str(&step_rules(granularity));
    prompt.push_str("- Use only the fields listed below. Add no other fields.\n\n");
    prompt.push_str(OUTPUT_SCHEMA);
    prompt
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
