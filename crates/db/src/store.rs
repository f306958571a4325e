//! [`TaskStore`] backed by PostgreSQL.
//!
//! A session is one database transaction. Dropping the session without
//! calling `commit` rolls the transaction back.

use async_trait::async_trait;
use microwins_core::breakdown::TaskBreakdown;
use microwins_core::error::CoreError;
use microwins_core::profile::UserProfile;
use microwins_core::rewards::UserStats;
use microwins_core::store::{
    BadgeAward, StepRecord, StoreSession, TaskCounts, TaskRecord, TaskStore,
};
use microwins_core::types::DbId;
use sqlx::{PgConnection, Postgres, Transaction};

use crate::models::task::CreateTask;
use crate::models::task_step::CreateTaskStep;
use crate::repositories::{BadgeRepo, ProfileRepo, TaskRepo, TaskStepRepo, UserStatsRepo};
use crate::DbPool;

/// Map a driver error into the domain taxonomy. The message is logged here
/// and sanitized at the HTTP boundary.
fn db_error(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Database error");
    CoreError::Internal(format!("Database error: {err}"))
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn begin(&self) -> Result<Box<dyn StoreSession>, CoreError> {
        let tx = self.pool.begin().await.map_err(db_error)?;
        Ok(Box::new(PgSession { tx: Some(tx) }))
    }

    async fn health_check(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool).await.map_err(db_error)
    }
}

pub struct PgSession {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgSession {
    fn conn(&mut self) -> Result<&mut PgConnection, CoreError> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| CoreError::Internal("Session already committed".to_string()))
    }
}

#[async_trait]
impl StoreSession for PgSession {
    async fn create_task(
        &mut self,
        user_id: &str,
        breakdown: &TaskBreakdown,
    ) -> Result<TaskRecord, CoreError> {
        let conn = self.conn()?;
        let input = CreateTask {
            user_id: user_id.to_string(),
            task_name: breakdown.task_name.clone(),
            difficulty_level: breakdown.difficulty_level,
        };
        let task = TaskRepo::create(&mut *conn, &input).await.map_err(db_error)?;

        let steps: Vec<CreateTaskStep> = breakdown
            .steps
            .iter()
            .map(|s| CreateTaskStep {
                step_order: s.step_number,
                step_text: s.text.clone(),
                estimated_time_minutes: s.estimated_time_minutes,
            })
            .collect();
        TaskStepRepo::create_all(&mut *conn, task.id, &steps)
            .await
            .map_err(db_error)?;

        task.try_into()
    }

    async fn get_task(&mut self, task_id: DbId) -> Result<Option<TaskRecord>, CoreError> {
        let row = TaskRepo::find_for_update(self.conn()?, task_id)
            .await
            .map_err(db_error)?;
        row.map(TaskRecord::try_from).transpose()
    }

    async fn get_step_at(
        &mut self,
        task_id: DbId,
        step_order: i32,
    ) -> Result<Option<StepRecord>, CoreError> {
        let row = TaskStepRepo::find_by_order(self.conn()?, task_id, step_order)
            .await
            .map_err(db_error)?;
        Ok(row.map(StepRecord::from))
    }

    async fn count_steps(&mut self, task_id: DbId) -> Result<i32, CoreError> {
        let count = TaskStepRepo::count_for_task(self.conn()?, task_id)
            .await
            .map_err(db_error)?;
        i32::try_from(count).map_err(|_| CoreError::Internal(format!("Step count {count} out of range")))
    }

    async fn mark_step_done(&mut self, task_id: DbId, step_order: i32) -> Result<(), CoreError> {
        let found = TaskStepRepo::mark_done(self.conn()?, task_id, step_order)
            .await
            .map_err(db_error)?;
        if !found {
            return Err(CoreError::NotFound {
                entity: "TaskStep",
                id: format!("{task_id}/{step_order}"),
            });
        }
        Ok(())
    }

    async fn advance_task_index(
        &mut self,
        task_id: DbId,
        expected_index: i32,
    ) -> Result<bool, CoreError> {
        TaskRepo::advance_index(self.conn()?, task_id, expected_index)
            .await
            .map_err(db_error)
    }

    async fn complete_task(&mut self, task_id: DbId) -> Result<(), CoreError> {
        let found = TaskRepo::complete(self.conn()?, task_id)
            .await
            .map_err(db_error)?;
        if !found {
            return Err(CoreError::NotFound {
                entity: "Task",
                id: task_id.to_string(),
            });
        }
        Ok(())
    }

    async fn get_user_stats(&mut self, user_id: &str) -> Result<Option<UserStats>, CoreError> {
        let row = UserStatsRepo::find(self.conn()?, user_id)
            .await
            .map_err(db_error)?;
        Ok(row.map(UserStats::from))
    }

    async fn lock_user_stats(&mut self, user_id: &str) -> Result<Option<UserStats>, CoreError> {
        let row = UserStatsRepo::find_for_update(self.conn()?, user_id)
            .await
            .map_err(db_error)?;
        Ok(Some(UserStats::from(row)))
    }

    async fn upsert_user_stats(&mut self, user_id: &str, stats: &UserStats) -> Result<(), CoreError> {
        UserStatsRepo::upsert(
            self.conn()?,
            user_id,
            stats.reward_points,
            stats.streak,
            stats.last_completed_date,
        )
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn award_badge_if_absent(&mut self, user_id: &str, badge_code: &str) -> Result<bool, CoreError> {
        BadgeRepo::award(self.conn()?, user_id, badge_code)
            .await
            .map_err(db_error)
    }

    async fn lifetime_completed_count(&mut self, user_id: &str) -> Result<i64, CoreError> {
        let (completed, _) = TaskRepo::count_by_status(self.conn()?, user_id)
            .await
            .map_err(db_error)?;
        Ok(completed)
    }

    async fn get_profile(&mut self, user_id: &str) -> Result<Option<UserProfile>, CoreError> {
        let row = ProfileRepo::find(self.conn()?, user_id)
            .await
            .map_err(db_error)?;
        row.map(UserProfile::try_from).transpose()
    }

    async fn upsert_profile(&mut self, user_id: &str, profile: &UserProfile) -> Result<(), CoreError> {
        ProfileRepo::upsert(self.conn()?, user_id, profile)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn list_badges(&mut self, user_id: &str) -> Result<Vec<BadgeAward>, CoreError> {
        let rows = BadgeRepo::list_for_user(self.conn()?, user_id)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(BadgeAward::from).collect())
    }

    async fn task_counts(&mut self, user_id: &str) -> Result<TaskCounts, CoreError> {
        let conn = self.conn()?;
        let (completed_tasks, active_tasks) = TaskRepo::count_by_status(&mut *conn, user_id)
            .await
            .map_err(db_error)?;
        let completed_steps = TaskStepRepo::count_done_for_user(&mut *conn, user_id)
            .await
            .map_err(db_error)?;
        Ok(TaskCounts {
            completed_tasks,
            active_tasks,
            completed_steps,
        })
    }

    async fn recent_completed_tasks(
        &mut self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<TaskRecord>, CoreError> {
        let rows = TaskRepo::list_recent_completed(self.conn()?, user_id, limit)
            .await
            .map_err(db_error)?;
        rows.into_iter().map(TaskRecord::try_from).collect()
    }

    async fn commit(&mut self) -> Result<(), CoreError> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| CoreError::Internal("Session already committed".to_string()))?;
        tx.commit().await.map_err(db_error)
    }
}
