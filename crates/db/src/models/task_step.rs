//! Task step model.

use microwins_core::store::StepRecord;
use microwins_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `task_steps` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TaskStep {
    pub task_id: DbId,
    pub step_order: i32,
    pub step_text: String,
    pub estimated_time_minutes: i32,
    pub is_done: bool,
    pub done_at: Option<Timestamp>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskStep {
    pub step_order: i32,
    pub step_text: String,
    pub estimated_time_minutes: i32,
}

impl From<TaskStep> for StepRecord {
    fn from(row: TaskStep) -> Self {
        StepRecord {
            task_id: row.task_id,
            step_order: row.step_order,
            step_text: row.step_text,
            estimated_time_minutes: row.estimated_time_minutes,
            is_done: row.is_done,
            done_at: row.done_at,
        }
    }
}
