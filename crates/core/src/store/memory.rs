//! In-process implementation of the persistence contract.
//!
//! A session takes the store-wide lock for its whole lifetime. Reads go to
//! the locked state; the first write clones it into a private working copy,
//! which `commit` writes back. Sessions are therefore fully serialized, and
//! read-only sessions never copy the state.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{BadgeAward, StepRecord, StoreSession, TaskCounts, TaskRecord, TaskStore};
use crate::breakdown::TaskBreakdown;
use crate::error::CoreError;
use crate::profile::UserProfile;
use crate::progress::TaskStatus;
use crate::rewards::UserStats;
use crate::types::{DbId, UserId};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    last_task_id: DbId,
    tasks: BTreeMap<DbId, TaskRecord>,
    steps: BTreeMap<(DbId, i32), StepRecord>,
    stats: HashMap<UserId, UserStats>,
    badges: HashMap<UserId, Vec<BadgeAward>>,
    profiles: HashMap<UserId, UserProfile>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreSession>, CoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        Ok(Box::new(MemorySession {
            guard,
            working: None,
        }))
    }

    async fn health_check(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

struct MemorySession {
    guard: OwnedMutexGuard<MemoryState>,
    working: Option<MemoryState>,
}

impl MemorySession {
    fn state(&self) -> &MemoryState {
        self.working.as_ref().unwrap_or(&*self.guard)
    }

    fn state_mut(&mut self) -> &mut MemoryState {
        let guard = &self.guard;
        self.working.get_or_insert_with(|| (**guard).clone())
    }

    fn task_mut(&mut self, task_id: DbId) -> Result<&mut TaskRecord, CoreError> {
        self.state_mut()
            .tasks
            .get_mut(&task_id)
            .ok_or_else(|| CoreError::NotFound {
                entity: "Task",
                id: task_id.to_string(),
            })
    }

    fn completed_tasks<'a>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a TaskRecord> + 'a {
        self.state()
            .tasks
            .values()
            .filter(move |t| t.user_id == user_id && t.status == TaskStatus::Completed)
    }
}

#[async_trait]
impl StoreSession for MemorySession {
    async fn create_task(
        &mut self,
        user_id: &str,
        breakdown: &TaskBreakdown,
    ) -> Result<TaskRecord, CoreError> {
        let state = self.state_mut();
        state.last_task_id += 1;
        let task = TaskRecord {
            id: state.last_task_id,
            user_id: user_id.to_string(),
            task_name: breakdown.task_name.clone(),
            difficulty_level: breakdown.difficulty_level,
            current_step_index: 0,
            status: TaskStatus::Active,
            created_at: Utc::now(),
            completed_at: None,
        };
        for step in &breakdown.steps {
            state.steps.insert(
                (task.id, step.step_number),
                StepRecord {
                    task_id: task.id,
                    step_order: step.step_number,
                    step_text: step.text.clone(),
                    estimated_time_minutes: step.estimated_time_minutes,
                    is_done: false,
                    done_at: None,
                },
            );
        }
        state.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn get_task(&mut self, task_id: DbId) -> Result<Option<TaskRecord>, CoreError> {
        Ok(self.state().tasks.get(&task_id).cloned())
    }

    async fn get_step_at(
        &mut self,
        task_id: DbId,
        step_order: i32,
    ) -> Result<Option<StepRecord>, CoreError> {
        Ok(self.state().steps.get(&(task_id, step_order)).cloned())
    }

    async fn count_steps(&mut self, task_id: DbId) -> Result<i32, CoreError> {
        let count = self
            .state()
            .steps
            .range((task_id, i32::MIN)..=(task_id, i32::MAX))
            .count();
        Ok(count as i32)
    }

    async fn mark_step_done(&mut self, task_id: DbId, step_order: i32) -> Result<(), CoreError> {
        let step = self
            .state_mut()
            .steps
            .get_mut(&(task_id, step_order))
            .ok_or_else(|| CoreError::NotFound {
                entity: "TaskStep",
                id: format!("{task_id}/{step_order}"),
            })?;
        if !step.is_done {
            step.is_done = true;
            step.done_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn advance_task_index(
        &mut self,
        task_id: DbId,
        expected_index: i32,
    ) -> Result<bool, CoreError> {
        let task = self.task_mut(task_id)?;
        if task.status != TaskStatus::Active || task.current_step_index != expected_index {
            return Ok(false);
        }
        task.current_step_index += 1;
        Ok(true)
    }

    async fn complete_task(&mut self, task_id: DbId) -> Result<(), CoreError> {
        let task = self.task_mut(task_id)?;
        if task.status != TaskStatus::Completed {
            task.status = TaskStatus::Completed;
            task.completed_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn get_user_stats(&mut self, user_id: &str) -> Result<Option<UserStats>, CoreError> {
        Ok(self.state().stats.get(user_id).cloned())
    }

    async fn lock_user_stats(&mut self, user_id: &str) -> Result<Option<UserStats>, CoreError> {
        // The session already holds the store-wide lock.
        self.get_user_stats(user_id).await
    }

    async fn upsert_user_stats(&mut self, user_id: &str, stats: &UserStats) -> Result<(), CoreError> {
        self.state_mut().stats.insert(user_id.to_string(), stats.clone());
        Ok(())
    }

    async fn award_badge_if_absent(&mut self, user_id: &str, badge_code: &str) -> Result<bool, CoreError> {
        let awards = self.state_mut().badges.entry(user_id.to_string()).or_default();
        if awards.iter().any(|a| a.badge_code == badge_code) {
            return Ok(false);
        }
        awards.push(BadgeAward {
            badge_code: badge_code.to_string(),
            earned_at: Utc::now(),
        });
        Ok(true)
    }

    async fn lifetime_completed_count(&mut self, user_id: &str) -> Result<i64, CoreError> {
        Ok(self.completed_tasks(user_id).count() as i64)
    }

    async fn get_profile(&mut self, user_id: &str) -> Result<Option<UserProfile>, CoreError> {
        Ok(self.state().profiles.get(user_id).cloned())
    }

    async fn upsert_profile(&mut self, user_id: &str, profile: &UserProfile) -> Result<(), CoreError> {
        self.state_mut().profiles.insert(user_id.to_string(), profile.clone());
        Ok(())
    }

    async fn list_badges(&mut self, user_id: &str) -> Result<Vec<BadgeAward>, CoreError> {
        Ok(self.state().badges.get(user_id).cloned().unwrap_or_default())
    }

    async fn task_counts(&mut self, user_id: &str) -> Result<TaskCounts, CoreError> {
        let state = self.state();
        let mut counts = TaskCounts::default();
        for task in state.tasks.values().filter(|t| t.user_id == user_id) {
            match task.status {
                TaskStatus::Active => counts.active_tasks += 1,
                TaskStatus::Completed => counts.completed_tasks += 1,
            }
        }
        counts.completed_steps = state
            .steps
            .values()
            .filter(|s| s.is_done)
            .filter(|s| {
                state
                    .tasks
                    .get(&s.task_id)
                    .is_some_and(|t| t.user_id == user_id)
            })
            .count() as i64;
        Ok(counts)
    }

    async fn recent_completed_tasks(
        &mut self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<TaskRecord>, CoreError> {
        let mut tasks: Vec<TaskRecord> = self.completed_tasks(user_id).cloned().collect();
        tasks.sort_by(|a, b| b.completed_at.cmp(&a.completed_at).then(b.id.cmp(&a.id)));
        tasks.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(tasks)
    }

    async fn commit(&mut self) -> Result<(), CoreError> {
        if let Some(working) = self.working.take() {
            *self.guard = working;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
