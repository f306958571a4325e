//! Task model.

use microwins_core::error::CoreError;
use microwins_core::progress::TaskStatus;
use microwins_core::store::TaskRecord;
use microwins_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `tasks` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Task {
    pub id: DbId,
    pub user_id: String,
    pub task_name: String,
    pub difficulty_level: i32,
    pub current_step_index: i32,
    pub status: String,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

/// DTO for creating a new task. Steps are inserted separately.
#[derive(Debug, Deserialize)]
pub struct CreateTask {
    pub user_id: String,
    pub task_name: String,
    pub difficulty_level: i32,
}

impl TryFrom<Task> for TaskRecord {
    type Error = CoreError;

    fn try_from(row: Task) -> Result<Self, Self::Error> {
        Ok(TaskRecord {
            id: row.id,
            user_id: row.user_id,
            task_name: row.task_name,
            difficulty_level: row.difficulty_level,
            current_step_index: row.current_step_index,
            status: row.status.parse::<TaskStatus>()?,
            created_at: row.created_at,
            completed_at: row.completed_at,
        })
    }
}
