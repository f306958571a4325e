//! Integration tests for the PostgreSQL store.
//!
//! Require a running database (`DATABASE_URL`); run with `--ignored`.

use chrono::NaiveDate;
use microwins_core::breakdown::{Step, TaskBreakdown};
use microwins_core::profile::{Neurodivergence, StepGranularity, UserProfile};
use microwins_core::progress::TaskStatus;
use microwins_core::rewards::UserStats;
use microwins_core::store::TaskStore;
use microwins_core::tasks::{advance_task, create_task, stats_summary, AdvanceOutcome};
use microwins_db::PgStore;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn breakdown(count: i32) -> TaskBreakdown {
    TaskBreakdown {
        task_name: "Pack a suitcase".to_string(),
        difficulty_level: 3,
        steps: (1..=count)
            .map(|n| Step {
                step_number: n,
                text: format!("Fold item {n}"),
                estimated_time_minutes: 2,
            })
            .collect(),
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 2).unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires PostgreSQL"]
async fn health_check_passes(pool: PgPool) {
    microwins_db::health_check(&pool).await.unwrap();
    PgStore::new(pool).health_check().await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires PostgreSQL"]
async fn rollback_on_drop(pool: PgPool) {
    let store = PgStore::new(pool);
    {
        let mut session = store.begin().await.unwrap();
        session.create_task("u1", &breakdown(4)).await.unwrap();
    }
    let mut session = store.begin().await.unwrap();
    assert_eq!(session.task_counts("u1").await.unwrap().active_tasks, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires PostgreSQL"]
async fn full_task_lifecycle(pool: PgPool) {
    let store = PgStore::new(pool);
    let task = create_task(&store, "u1", &breakdown(3)).await.unwrap();
    assert_eq!(task.status, TaskStatus::Active);
    assert_eq!(task.current_step_index, 0);

    for _ in 0..2 {
        let outcome = advance_task(&store, "u1", task.id, today()).await.unwrap();
        assert!(matches!(outcome, AdvanceOutcome::Advanced { .. }));
    }
    let outcome = advance_task(&store, "u1", task.id, today()).await.unwrap();
    let AdvanceOutcome::Completed { rewards: Some(rewards), .. } = outcome else {
        panic!("expected completion");
    };
    assert_eq!(rewards.stats.reward_points, 10);
    let codes: Vec<_> = rewards.new_badges.iter().map(|b| b.code).collect();
    assert_eq!(codes, vec!["first_task", "hard_worker"]);

    let again = advance_task(&store, "u1", task.id, today()).await.unwrap();
    assert_eq!(again, AdvanceOutcome::AlreadyCompleted { task_id: task.id });

    let summary = stats_summary(&store, "u1").await.unwrap();
    assert_eq!(summary.total_tasks_completed, 1);
    assert_eq!(summary.total_steps_completed, 3);
    assert_eq!(summary.badges.len(), 2);
    assert_eq!(summary.recent_tasks.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires PostgreSQL"]
async fn advance_index_is_compare_and_swap(pool: PgPool) {
    let store = PgStore::new(pool);
    let task = create_task(&store, "u1", &breakdown(4)).await.unwrap();

    let mut session = store.begin().await.unwrap();
    assert!(session.advance_task_index(task.id, 0).await.unwrap());
    assert!(!session.advance_task_index(task.id, 0).await.unwrap());
    session.commit().await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires PostgreSQL"]
async fn badge_insert_is_idempotent(pool: PgPool) {
    let store = PgStore::new(pool);
    let mut session = store.begin().await.unwrap();
    assert!(session.award_badge_if_absent("u1", "streak_3").await.unwrap());
    assert!(!session.award_badge_if_absent("u1", "streak_3").await.unwrap());
    assert_eq!(session.list_badges("u1").await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires PostgreSQL"]
async fn stats_and_profile_upsert(pool: PgPool) {
    let store = PgStore::new(pool);
    let mut session = store.begin().await.unwrap();

    let stats = UserStats {
        reward_points: 30,
        streak: 2,
        last_completed_date: Some(today()),
    };
    session.upsert_user_stats("u1", &stats).await.unwrap();
    session.upsert_user_stats("u1", &stats).await.unwrap();
    assert_eq!(session.get_user_stats("u1").await.unwrap(), Some(stats));

    let profile = UserProfile {
        neurodivergence: Neurodivergence::Autism,
        break_interval_minutes: 15,
        fatigue_triggers: vec!["crowds".to_string()],
        tones: vec!["strict".to_string()],
        verbosity: 4,
        step_granularity: StepGranularity::Macro,
    };
    session.upsert_profile("u1", &profile).await.unwrap();
    assert_eq!(session.get_profile("u1").await.unwrap(), Some(profile));
    assert_eq!(session.get_profile("u2").await.unwrap(), None);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires PostgreSQL"]
async fn concurrent_completions_by_one_user_both_count(pool: PgPool) {
    let store = PgStore::new(pool);
    let first = create_task(&store, "u1", &breakdown(1)).await.unwrap();
    let second = create_task(&store, "u1", &breakdown(1)).await.unwrap();

    let (a, b) = tokio::join!(
        advance_task(&store, "u1", first.id, today()),
        advance_task(&store, "u1", second.id, today()),
    );
    assert!(matches!(a.unwrap(), AdvanceOutcome::Completed { .. }));
    assert!(matches!(b.unwrap(), AdvanceOutcome::Completed { .. }));

    let summary = stats_summary(&store, "u1").await.unwrap();
    assert_eq!(summary.reward_points, 20);
    assert_eq!(summary.streak, 1);
    assert_eq!(summary.total_tasks_completed, 2);
    let codes: Vec<_> = summary.badges.iter().map(|b| b.code.as_str()).collect();
    assert_eq!(codes.iter().filter(|c| **c == "first_task").count(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires PostgreSQL"]
async fn locking_stats_creates_zeroed_row(pool: PgPool) {
    let store = PgStore::new(pool);
    let mut session = store.begin().await.unwrap();

    assert_eq!(
        session.lock_user_stats("fresh").await.unwrap(),
        Some(UserStats::default())
    );
    assert_eq!(
        session.get_user_stats("fresh").await.unwrap(),
        Some(UserStats::default())
    );
}
