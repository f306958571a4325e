//! Breakdown types and the parser/validator for raw model output.
//!
//! Parsing is all-or-nothing: either every field passes its check and a
//! [`TaskBreakdown`] comes back, or the call fails with
//! [`CoreError::SchemaValidation`] carrying the untouched raw text.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::profile::{StepGranularity, UserProfile};

/// Inclusive bounds for `difficulty_level`.
pub const MIN_DIFFICULTY: i64 = 1;
pub const MAX_DIFFICULTY: i64 = 5;

/// Inclusive bounds for `estimated_time_minutes`.
pub const MIN_STEP_MINUTES: i64 = 1;
pub const MAX_STEP_MINUTES: i64 = 5;

/// Maximum number of words in one step's text under the strict schema.
pub const MAX_STEP_WORDS: usize = 20;

/// Output contract embedded verbatim at the end of every prompt.
pub const OUTPUT_SCHEMA: &str = r#"Respond with a single JSON object with exactly these fields:
{
  "task_name": string (short name of the task),
  "difficulty_level": integer from 1 (easy) to 5 (hard),
  "steps": [
    {
      "step_number": integer starting at 1 and increasing by 1,
      "text": string (one small, single-action step),
      "estimated_time_minutes": integer from 1 to 5
    }
  ]
}
Return JSON only. No prose before or after it. No code fences."#;

const TOP_LEVEL_FIELDS: [&str; 3] = ["task_name", "difficulty_level", "steps"];
const STEP_FIELDS: [&str; 3] = ["step_number", "text", "estimated_time_minutes"];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub step_number: i32,
    pub text: String,
    pub estimated_time_minutes: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskBreakdown {
    pub task_name: String,
    pub difficulty_level: i32,
    pub steps: Vec<Step>,
}

impl TaskBreakdown {
    /// Sum of every step's estimate.
    pub fn total_minutes(&self) -> i32 {
        self.steps.iter().map(|s| s.estimated_time_minutes).sum()
    }
}

/// How strictly model output is checked against the field list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSchema {
    /// Unknown extra fields are ignored.
    Rich,
    /// Unknown fields are rejected and step text is capped at
    /// [`MAX_STEP_WORDS`] words.
    Strict,
}

/// Which prompt template a breakdown request uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakdownMode {
    /// Full profile-aware template.
    Profile(UserProfile),
    /// Short template with no profile section.
    Minimal { granularity: StepGranularity },
}

impl BreakdownMode {
    pub fn granularity(&self) -> StepGranularity {
        match self {
            Self::Profile(profile) => profile.step_granularity,
            Self::Minimal { granularity } => *granularity,
        }
    }

    pub fn schema(&self) -> OutputSchema {
        match self {
            Self::Profile(_) => OutputSchema::Rich,
            Self::Minimal { .. } => OutputSchema::Strict,
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawStep {
    step_number: i64,
    text: String,
    estimated_time_minutes: i64,
}

#[derive(Debug, Deserialize)]
struct RawBreakdown {
    task_name: String,
    difficulty_level: i64,
    steps: Vec<RawStep>,
}

/// Remove one surrounding ``` or ```json fence, if present.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Language tag, if any, runs to the first newline.
    let body = match body.split_once('\n') {
        Some((tag, after)) if tag.trim().chars().all(|c| c.is_ascii_alphanumeric()) => after,
        _ => body,
    };
    body.trim()
}

/// Parse and validate raw model output into a [`TaskBreakdown`].
pub fn parse_breakdown(
    raw: &str,
    granularity: StepGranularity,
    schema: OutputSchema,
) -> Result<TaskBreakdown, CoreError> {
    validate_breakdown(raw, granularity, schema).map_err(|reason| CoreError::SchemaValidation {
        reason,
        raw: raw.to_string(),
    })
}

fn validate_breakdown(
    raw: &str,
    granularity: StepGranularity,
    schema: OutputSchema,
) -> Result<TaskBreakdown, String> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| format!("Output is not valid JSON: {e}"))?;

    if schema == OutputSchema::Strict {
        check_strict_fields(&value)?;
    }

    let parsed: RawBreakdown = serde_json::from_value(value)
        .map_err(|e| format!("Output does not match the breakdown shape: {e}"))?;

    let task_name = parsed.task_name.trim();
    if task_name.is_empty() {
        return Err("task_name must not be empty".to_string());
    }
    if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&parsed.difficulty_level) {
        return Err(format!(
            "difficulty_level must be between {MIN_DIFFICULTY} and {MAX_DIFFICULTY}, got {}",
            parsed.difficulty_level
        ));
    }

    let range = granularity.step_range();
    if !range.contains(&parsed.steps.len()) {
        return Err(format!(
            "{granularity} granularity requires {} to {} steps, got {}",
            range.start(),
            range.end(),
            parsed.steps.len()
        ));
    }

    let mut steps = Vec::with_capacity(parsed.steps.len());
    for (index, step) in parsed.steps.into_iter().enumerate() {
        let expected = index as i64 + 1;
        if step.step_number != expected {
            return Err(format!(
                "steps must be numbered 1..N; position {expected} has step_number {}",
                step.step_number
            ));
        }
        let text = step.text.trim();
        if text.is_empty() {
            return Err(format!("step {expected} has empty text"));
        }
        if !(MIN_STEP_MINUTES..=MAX_STEP_MINUTES).contains(&step.estimated_time_minutes) {
            return Err(format!(
                "step {expected} estimated_time_minutes must be between {MIN_STEP_MINUTES} and {MAX_STEP_MINUTES}, got {}",
                step.estimated_time_minutes
            ));
        }
        if schema == OutputSchema::Strict {
            let words = text.split_whitespace().count();
            if words > MAX_STEP_WORDS {
                return Err(format!(
                    "step {expected} has {words} words; at most {MAX_STEP_WORDS} allowed"
                ));
            }
        }
        steps.push(Step {
            step_number: expected as i32,
            text: text.to_string(),
            estimated_time_minutes: step.estimated_time_minutes as i32,
        });
    }

    Ok(TaskBreakdown {
        task_name: task_name.to_string(),
        difficulty_level: parsed.difficulty_level as i32,
        steps,
    })
}

fn check_strict_fields(value: &Value) -> Result<(), String> {
    let Value::Object(top) = value else {
        return Err("Output must be a JSON object".to_string());
    };
    reject_unknown(top, &TOP_LEVEL_FIELDS, "breakdown")?;
    if let Some(Value::Array(steps)) = top.get("steps") {
        for (index, step) in steps.iter().enumerate() {
            if let Value::Object(fields) = step {
                reject_unknown(fields, &STEP_FIELDS, &format!("step {}", index + 1))?;
            }
        }
    }
    Ok(())
}

fn reject_unknown(fields: &Map<String, Value>, allowed: &[&str], context: &str) -> Result<(), String> {
    match fields.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(unknown) => Err(format!("Unknown field '{unknown}' in {context}")),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
