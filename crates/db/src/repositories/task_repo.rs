//! Repository for the `tasks` table.

use microwins_core::types::DbId;
use sqlx::PgConnection;

use crate::models::task::{CreateTask, Task};

/// Column list for tasks queries.
const COLUMNS: &str = "id, user_id, task_name, difficulty_level, current_step_index, \
                       status, created_at, completed_at";

pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new active task at index 0, returning the created row.
    pub async fn create(conn: &mut PgConnection, input: &CreateTask) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (user_id, task_name, difficulty_level)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(&input.user_id)
            .bind(&input.task_name)
            .bind(input.difficulty_level)
            .fetch_one(conn)
            .await
    }

    /// Find a task by ID and lock its row until the transaction ends.
    pub async fn find_for_update(conn: &mut PgConnection, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Increment `current_step_index` only if it still equals `expected_index`.
    /// Returns `true` if the row was updated.
    pub async fn advance_index(
        conn: &mut PgConnection,
        id: DbId,
        expected_index: i32,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tasks SET current_step_index = current_step_index + 1
             WHERE id = $1 AND current_step_index = $2 AND status = 'active'",
        )
        .bind(id)
        .bind(expected_index)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a task completed. The first completion time is kept.
    pub async fn complete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tasks SET status = 'completed', completed_at = COALESCE(completed_at, now())
             WHERE id = $1",
        )
        .bind(id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count a user's tasks as `(completed, active)`.
    pub async fn count_by_status(conn: &mut PgConnection, user_id: &str) -> Result<(i64, i64), sqlx::Error> {
        sqlx::query_as(
            "SELECT COUNT(*) FILTER (WHERE status = 'completed'),
                    COUNT(*) FILTER (WHERE status = 'active')
             FROM tasks WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(conn)
        .await
    }

    /// List a user's completed tasks, most recently completed first.
    pub async fn list_recent_completed(
        conn: &mut PgConnection,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE user_id = $1 AND status = 'completed'
             ORDER BY completed_at DESC NULLS LAST, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(conn)
            .await
    }
}
