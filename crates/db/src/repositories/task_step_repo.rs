//! Repository for the `task_steps` table.

use microwins_core::types::DbId;
use sqlx::PgConnection;

use crate::models::task_step::{CreateTaskStep, TaskStep};

const COLUMNS: &str = "task_id, step_order, step_text, estimated_time_minutes, is_done, done_at";

pub struct TaskStepRepo;

impl TaskStepRepo {
    /// Insert every step of a task.
    pub async fn create_all(
        conn: &mut PgConnection,
        task_id: DbId,
        steps: &[CreateTaskStep],
    ) -> Result<(), sqlx::Error> {
        for step in steps {
            sqlx::query(
                "INSERT INTO task_steps (task_id, step_order, step_text, estimated_time_minutes)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(task_id)
            .bind(step.step_order)
            .bind(&step.step_text)
            .bind(step.estimated_time_minutes)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    pub async fn find_by_order(
        conn: &mut PgConnection,
        task_id: DbId,
        step_order: i32,
    ) -> Result<Option<TaskStep>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM task_steps WHERE task_id = $1 AND step_order = $2");
        sqlx::query_as::<_, TaskStep>(&query)
            .bind(task_id)
            .bind(step_order)
            .fetch_optional(conn)
            .await
    }

    pub async fn count_for_task(conn: &mut PgConnection, task_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM task_steps WHERE task_id = $1")
            .bind(task_id)
            .fetch_one(conn)
            .await?;
        Ok(count)
    }

    /// Mark a step done. A step that is already done keeps its `done_at`.
    /// Returns `true` if the step exists.
    pub async fn mark_done(
        conn: &mut PgConnection,
        task_id: DbId,
        step_order: i32,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE task_steps SET is_done = TRUE, done_at = COALESCE(done_at, now())
             WHERE task_id = $1 AND step_order = $2",
        )
        .bind(task_id)
        .bind(step_order)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count done steps across every task the user owns.
    pub async fn count_done_for_user(conn: &mut PgConnection, user_id: &str) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM task_steps s
             JOIN tasks t ON s.task_id = t.id
             WHERE t.user_id = $1 AND s.is_done",
        )
        .bind(user_id)
        .fetch_one(conn)
        .await?;
        Ok(count)
    }
}
