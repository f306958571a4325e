//! Step-progress state machine.
//!
//! A task is `Active(i)` where `i` is the zero-based index of the next step
//! to do, or `Completed`. Each mark-done moves it forward by exactly one
//! step; completion is irreversible.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Active,
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(CoreError::Internal(format!("Unknown task status '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressState {
    Active(i32),
    Completed,
}

impl ProgressState {
    pub fn from_record(status: TaskStatus, current_step_index: i32) -> Self {
        match status {
            TaskStatus::Active => Self::Active(current_step_index),
            TaskStatus::Completed => Self::Completed,
        }
    }
}

/// What one mark-done does to a task with `step_count` steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The task was already completed. Nothing changes.
    AlreadyCompleted,
    /// The index already points past the last step; close the task
    /// without marking anything or awarding rewards.
    CloseExhausted,
    /// Mark step `completed_order` done and move the index to `next_index`.
    /// When `finishes` is set the task becomes completed.
    Advance {
        completed_order: i32,
        next_index: i32,
        finishes: bool,
    },
}

impl Transition {
    /// Order (1-based) of the step to present after this transition, if any.
    pub fn next_order(&self) -> Option<i32> {
        match self {
            Self::Advance {
                next_index,
                finishes: false,
                ..
            } => Some(next_index + 1),
            _ => None,
        }
    }
}

pub fn advance(state: ProgressState, step_count: i32) -> Transition {
    match state {
        ProgressState::Completed => Transition::AlreadyCompleted,
        ProgressState::Active(index) if index >= step_count => Transition::CloseExhausted,
        ProgressState::Active(index) => {
            let next_index = index + 1;
            Transition::Advance {
                completed_order: index + 1,
                next_index,
                finishes: next_index >= step_count,
            }
        }
    }
}

/// Progress through a task's steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub completed_steps: i32,
    pub total_steps: i32,
    /// Share of completed steps, in percent, rounded to two decimals.
    pub percentage: f64,
}

impl Progress {
    pub fn new(completed_steps: i32, total_steps: i32) -> Self {
        let completed_steps = completed_steps.clamp(0, total_steps.max(0));
        let percentage = if total_steps > 0 {
            (f64::from(completed_steps) / f64::from(total_steps) * 10_000.0).round() / 100.0
        } else {
            0.0
        };
        Self {
            completed_steps,
            total_steps,
            percentage,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
