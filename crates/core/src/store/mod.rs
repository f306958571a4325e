//! Persistence contract.
//!
//! A [`TaskStore`] hands out [`StoreSession`]s. Every write made through a
//! session becomes visible only after [`StoreSession::commit`]; dropping a
//! session without committing discards its writes. One request uses one
//! session, so a multi-step update (advance + complete + rewards) lands
//! atomically or not at all.

pub mod memory;

use async_trait::async_trait;
use serde::Serialize;

use crate::breakdown::{Step, TaskBreakdown};
use crate::error::CoreError;
use crate::profile::UserProfile;
use crate::progress::TaskStatus;
use crate::rewards::UserStats;
use crate::types::{DbId, Timestamp, UserId};

pub use memory::MemoryStore;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRecord {
    pub id: DbId,
    pub user_id: UserId,
    pub task_name: String,
    pub difficulty_level: i32,
    /// Zero-based index of the next step to do.
    pub current_step_index: i32,
    pub status: TaskStatus,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub task_id: DbId,
    pub step_order: i32,
    pub step_text: String,
    pub estimated_time_minutes: i32,
    pub is_done: bool,
    pub done_at: Option<Timestamp>,
}

impl StepRecord {
    pub fn to_step(&self) -> Step {
        Step {
            step_number: self.step_order,
            text: self.step_text.clone(),
            estimated_time_minutes: self.estimated_time_minutes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadgeAward {
    pub badge_code: String,
    pub earned_at: Timestamp,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub completed_tasks: i64,
    pub active_tasks: i64,
    pub completed_steps: i64,
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Open a session. The session must be dropped before the same task
    /// opens another one.
    async fn begin(&self) -> Result<Box<dyn StoreSession>, CoreError>;

    async fn health_check(&self) -> Result<(), CoreError>;
}

#[async_trait]
pub trait StoreSession: Send {
    /// Persist a task (index 0, `active`) and all of its steps.
    async fn create_task(
        &mut self,
        user_id: &str,
        breakdown: &TaskBreakdown,
    ) -> Result<TaskRecord, CoreError>;

    /// Load a task. Implementations lock the row for the rest of the session.
    async fn get_task(&mut self, task_id: DbId) -> Result<Option<TaskRecord>, CoreError>;

    /// Load the step with 1-based `step_order`.
    async fn get_step_at(
        &mut self,
        task_id: DbId,
        step_order: i32,
    ) -> Result<Option<StepRecord>, CoreError>;

    async fn count_steps(&mut self, task_id: DbId) -> Result<i32, CoreError>;

    /// Mark a step done. Marking an already-done step again is a no-op.
    async fn mark_step_done(&mut self, task_id: DbId, step_order: i32) -> Result<(), CoreError>;

    /// Move the index from `expected_index` to `expected_index + 1`.
    /// Returns `false` if the stored index was not `expected_index`.
    async fn advance_task_index(
        &mut self,
        task_id: DbId,
        expected_index: i32,
    ) -> Result<bool, CoreError>;

    async fn complete_task(&mut self, task_id: DbId) -> Result<(), CoreError>;

    async fn get_user_stats(&mut self, user_id: &str) -> Result<Option<UserStats>, CoreError>;

    /// Read the user's stats and hold them exclusively until the session
    /// ends. Completions by the same user are serialized on this call, so
    /// each one sees the points written by the previous one.
    async fn lock_user_stats(&mut self, user_id: &str) -> Result<Option<UserStats>, CoreError>;

    async fn upsert_user_stats(&mut self, user_id: &str, stats: &UserStats) -> Result<(), CoreError>;

    /// Record a badge unless the user already holds it. Returns `true` when
    /// the badge is new.
    async fn award_badge_if_absent(&mut self, user_id: &str, badge_code: &str) -> Result<bool, CoreError>;

    /// Number of completed tasks the user owns.
    async fn lifetime_completed_count(&mut self, user_id: &str) -> Result<i64, CoreError>;

    async fn get_profile(&mut self, user_id: &str) -> Result<Option<UserProfile>, CoreError>;

    async fn upsert_profile(&mut self, user_id: &str, profile: &UserProfile) -> Result<(), CoreError>;

    async fn list_badges(&mut self, user_id: &str) -> Result<Vec<BadgeAward>, CoreError>;

    async fn task_counts(&mut self, user_id: &str) -> Result<TaskCounts, CoreError>;

    /// Most recently completed tasks first.
    async fn recent_completed_tasks(
        &mut self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<TaskRecord>, CoreError>;

    /// Make every write of this session durable. The session must not be
    /// used afterwards.
    async fn commit(&mut self) -> Result<(), CoreError>;
}
