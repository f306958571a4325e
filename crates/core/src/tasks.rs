//! Task service: creation, current step, step advancement and the stats
//! summary, each run inside one store session.

use chrono::NaiveDate;
use serde::Serialize;

use crate::breakdown::{Step, TaskBreakdown};
use crate::error::CoreError;
use crate::progress::{advance, Progress, ProgressState, Transition};
use crate::rewards::{
    evaluate_completion, find_badge, motivational_message, BadgeDefinition, UserStats,
    REWARD_POINTS_PER_TASK,
};
use crate::store::{StoreSession, TaskCounts, TaskRecord, TaskStore};
use crate::types::{DbId, Timestamp, UserId};

/// Number of completed tasks listed in a stats summary.
pub const RECENT_TASKS_LIMIT: i64 = 5;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CurrentStep {
    Active {
        task_id: DbId,
        task_name: String,
        step: Step,
        progress: Progress,
    },
    Completed {
        task_id: DbId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewardSummary {
    pub points_awarded: i64,
    pub stats: UserStats,
    /// Badges earned by this completion that the user did not hold before.
    pub new_badges: Vec<BadgeDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdvanceOutcome {
    Advanced {
        task_id: DbId,
        completed_step: i32,
        next_step: Option<Step>,
        progress: Progress,
    },
    /// The task became completed by this call. `rewards` is absent when
    /// the task was closed without a step being marked.
    Completed {
        task_id: DbId,
        completed_step: Option<i32>,
        rewards: Option<RewardSummary>,
    },
    AlreadyCompleted {
        task_id: DbId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarnedBadge {
    pub code: String,
    pub name: String,
    pub description: String,
    pub emoji: String,
    pub earned_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentTask {
    pub task_id: DbId,
    pub task_name: String,
    pub completed_at: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub user_id: UserId,
    pub total_tasks_completed: i64,
    pub total_tasks_active: i64,
    pub total_steps_completed: i64,
    pub reward_points: i64,
    pub streak: i32,
    pub last_completed_date: Option<NaiveDate>,
    pub motivational_message: String,
    pub badges: Vec<EarnedBadge>,
    pub recent_tasks: Vec<RecentTask>,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Load a task owned by `user_id`. Tasks of other users are reported as
/// missing.
async fn owned_task(
    session: &mut dyn StoreSession,
    user_id: &str,
    task_id: DbId,
) -> Result<TaskRecord, CoreError> {
    match session.get_task(task_id).await? {
        Some(task) if task.user_id == user_id => Ok(task),
        _ => Err(CoreError::NotFound {
            entity: "Task",
            id: task_id.to_string(),
        }),
    }
}

/// Persist a generated breakdown as a new active task.
pub async fn create_task(
    store: &dyn TaskStore,
    user_id: &str,
    breakdown: &TaskBreakdown,
) -> Result<TaskRecord, CoreError> {
    if breakdown.steps.is_empty() {
        return Err(CoreError::InvalidInput(
            "A task needs at least one step".to_string(),
        ));
    }
    let mut session = store.begin().await?;
    let task = session.create_task(user_id, breakdown).await?;
    session.commit().await?;

    tracing::info!(
        user_id = %user_id,
        task_id = task.id,
        step_count = breakdown.steps.len(),
        "Task created",
    );
    Ok(task)
}

pub async fn current_step(
    store: &dyn TaskStore,
    user_id: &str,
    task_id: DbId,
) -> Result<CurrentStep, CoreError> {
    let mut session = store.begin().await?;
    let task = owned_task(session.as_mut(), user_id, task_id).await?;

    let ProgressState::Active(index) = ProgressState::from_record(task.status, task.current_step_index) else {
        return Ok(CurrentStep::Completed { task_id });
    };
    let total = session.count_steps(task_id).await?;
    match session.get_step_at(task_id, index + 1).await? {
        Some(step) => Ok(CurrentStep::Active {
            task_id,
            task_name: task.task_name,
            step: step.to_step(),
            progress: Progress::new(index, total),
        }),
        None => Ok(CurrentStep::Completed { task_id }),
    }
}

/// Mark the current step done and move the task forward by one step.
///
/// The completing transition also updates the user's stats and awards
/// badges. Every write happens in one session; nothing is persisted unless
/// all of them succeed.
pub async fn advance_task(
    store: &dyn TaskStore,
    user_id: &str,
    task_id: DbId,
    today: NaiveDate,
) -> Result<AdvanceOutcome, CoreError> {
    let mut session = store.begin().await?;
    let task = owned_task(session.as_mut(), user_id, task_id).await?;
    let step_count = session.count_steps(task_id).await?;
    let state = ProgressState::from_record(task.status, task.current_step_index);

    match advance(state, step_count) {
        Transition::AlreadyCompleted => {
            tracing::debug!(user_id = %user_id, task_id, "Task already completed");
            Ok(AdvanceOutcome::AlreadyCompleted { task_id })
        }
        Transition::CloseExhausted => {
            session.complete_task(task_id).await?;
            session.commit().await?;
            tracing::info!(user_id = %user_id, task_id, "Task closed with no remaining steps");
            Ok(AdvanceOutcome::Completed {
                task_id,
                completed_step: None,
                rewards: None,
            })
        }
        transition @ Transition::Advance {
            completed_order,
            next_index,
            finishes,
        } => {
            session.mark_step_done(task_id, completed_order).await?;
            if !session.advance_task_index(task_id, task.current_step_index).await? {
                return Err(CoreError::Conflict(format!(
                    "Task {task_id} was advanced concurrently"
                )));
            }

            if !finishes {
                let next_step = match transition.next_order() {
                    Some(order) => session.get_step_at(task_id, order).await?.map(|s| s.to_step()),
                    None => None,
                };
                session.commit().await?;
                tracing::debug!(user_id = %user_id, task_id, completed_order, "Step marked done");
                return Ok(AdvanceOutcome::Advanced {
                    task_id,
                    completed_step: completed_order,
                    next_step,
                    progress: Progress::new(next_index, step_count),
                });
            }

            session.complete_task(task_id).await?;
            let rewards = apply_rewards(session.as_mut(), user_id, task.difficulty_level, today).await?;
            session.commit().await?;

            tracing::info!(
                user_id = %user_id,
                task_id,
                streak = rewards.stats.streak,
                new_badges = rewards.new_badges.len(),
                "Task completed",
            );
            Ok(AdvanceOutcome::Completed {
                task_id,
                completed_step: Some(completed_order),
                rewards: Some(rewards),
            })
        }
    }
}

async fn apply_rewards(
    session: &mut dyn StoreSession,
    user_id: &str,
    difficulty: i32,
    today: NaiveDate,
) -> Result<RewardSummary, CoreError> {
    // Lock first so the count below sees every completion committed before us.
    let prior = session.lock_user_stats(user_id).await?;
    let lifetime_completed = session.lifetime_completed_count(user_id).await?;
    let evaluated = evaluate_completion(prior.as_ref(), today, difficulty, lifetime_completed);

    session.upsert_user_stats(user_id, &evaluated.stats).await?;

    let mut new_badges = Vec::new();
    for code in evaluated.qualifying_badges {
        if session.award_badge_if_absent(user_id, code).await? {
            if let Some(badge) = find_badge(code) {
                new_badges.push(*badge);
            }
        }
    }

    Ok(RewardSummary {
        points_awarded: REWARD_POINTS_PER_TASK,
        stats: evaluated.stats,
        new_badges,
    })
}

pub async fn stats_summary(store: &dyn TaskStore, user_id: &str) -> Result<StatsSummary, CoreError> {
    let mut session = store.begin().await?;
    let TaskCounts {
        completed_tasks,
        active_tasks,
        completed_steps,
    } = session.task_counts(user_id).await?;
    let stats = session.get_user_stats(user_id).await?.unwrap_or_default();

    let badges = session
        .list_badges(user_id)
        .await?
        .into_iter()
        .filter_map(|award| {
            find_badge(&award.badge_code).map(|def| EarnedBadge {
                code: def.code.to_string(),
                name: def.name.to_string(),
                description: def.description.to_string(),
                emoji: def.emoji.to_string(),
                earned_at: award.earned_at,
            })
        })
        .collect();

    let recent_tasks = session
        .recent_completed_tasks(user_id, RECENT_TASKS_LIMIT)
        .await?
        .into_iter()
        .map(|task| RecentTask {
            task_id: task.id,
            task_name: task.task_name,
            completed_at: task.completed_at,
        })
        .collect();

    Ok(StatsSummary {
        user_id: user_id.to_string(),
        total_tasks_completed: completed_tasks,
        total_tasks_active: active_tasks,
        total_steps_completed: completed_steps,
        reward_points: stats.reward_points,
        streak: stats.streak,
        last_completed_date: stats.last_completed_date,
        motivational_message: motivational_message(stats.streak, completed_tasks).to_string(),
        badges,
        recent_tasks,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
