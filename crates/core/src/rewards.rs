//! Streak, reward-point and badge rules applied when a task completes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Points granted for every completed task.
pub const REWARD_POINTS_PER_TASK: i64 = 10;

/// Difficulty at or above which a task counts as hard.
pub const HARD_DIFFICULTY_THRESHOLD: i32 = 3;

// ---------------------------------------------------------------------------
// Badge catalog
// ---------------------------------------------------------------------------

pub const BADGE_FIRST_TASK: &str = "first_task";
pub const BADGE_STREAK_3: &str = "streak_3";
pub const BADGE_STREAK_7: &str = "streak_7";
pub const BADGE_TEN_TASKS: &str = "ten_tasks";
pub const BADGE_HARD_WORKER: &str = "hard_worker";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BadgeDefinition {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub emoji: &'static str,
}

pub const BADGES: [BadgeDefinition; 5] = [
    BadgeDefinition {
        code: BADGE_FIRST_TASK,
        name: "First Win!",
        description: "Completed your first task.",
        emoji: "🥇",
    },
    BadgeDefinition {
        code: BADGE_STREAK_3,
        name: "3-Day Streak",
        description: "Completed tasks 3 days in a row.",
        emoji: "🔥",
    },
    BadgeDefinition {
        code: BADGE_STREAK_7,
        name: "7-Day Streak",
        description: "Completed tasks 7 days in a row.",
        emoji: "🏆",
    },
    BadgeDefinition {
        code: BADGE_TEN_TASKS,
        name: "10 Tasks Done",
        description: "Completed 10 tasks.",
        emoji: "🎯",
    },
    BadgeDefinition {
        code: BADGE_HARD_WORKER,
        name: "Hard Worker",
        description: "Completed a hard difficulty task.",
        emoji: "💪",
    },
];

pub fn find_badge(code: &str) -> Option<&'static BadgeDefinition> {
    BADGES.iter().find(|b| b.code == code)
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Per-user reward state. Mutated only when a task completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub reward_points: i64,
    pub streak: i32,
    pub last_completed_date: Option<NaiveDate>,
}

/// Streak after completing a task on `today`.
///
/// A last-completed date after `today` is treated as the same day.
pub fn next_streak(prior: Option<&UserStats>, today: NaiveDate) -> i32 {
    let Some((streak, last)) = prior.and_then(|s| s.last_completed_date.map(|d| (s.streak, d))) else {
        return 1;
    };
    match (today - last).num_days() {
        ..=0 => streak,
        1 => streak + 1,
        _ => 1,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRewards {
    pub stats: UserStats,
    /// Badge codes whose condition holds after this completion. The store
    /// decides which of them are new.
    pub qualifying_badges: Vec<&'static str>,
}

/// Evaluate the reward rules for one task completion.
///
/// `lifetime_completed` includes the task being completed. Badge
/// conditions on streak and count are exact matches.
pub fn evaluate_completion(
    prior: Option<&UserStats>,
    today: NaiveDate,
    difficulty: i32,
    lifetime_completed: i64,
) -> CompletionRewards {
    let streak = next_streak(prior, today);
    let stats = UserStats {
        reward_points: prior.map_or(0, |s| s.reward_points) + REWARD_POINTS_PER_TASK,
        streak,
        last_completed_date: Some(today),
    };

    let mut qualifying_badges = Vec::new();
    if lifetime_completed == 1 {
        qualifying_badges.push(BADGE_FIRST_TASK);
    }
    if streak == 3 {
        qualifying_badges.push(BADGE_STREAK_3);
    }
    if streak == 7 {
        qualifying_badges.push(BADGE_STREAK_7);
    }
    if lifetime_completed == 10 {
        qualifying_badges.push(BADGE_TEN_TASKS);
    }
    if difficulty >= HARD_DIFFICULTY_THRESHOLD {
        qualifying_badges.push(BADGE_HARD_WORKER);
    }

    CompletionRewards {
        stats,
        qualifying_badges,
    }
}

pub fn motivational_message(streak: i32, total_completed: i64) -> &'static str {
    if streak >= 7 {
        "🔥 Amazing! You're on a hot streak!"
    } else if streak >= 3 {
        "🌟 Great job! Keep your streak going!"
    } else if total_completed > 0 {
        "👏 Every step counts. Keep it up!"
    } else {
        "Let's get started with your first win!"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stats(streak: i32, last: Option<NaiveDate>) -> UserStats {
        UserStats {
            reward_points: 40,
            streak,
            last_completed_date: last,
        }
    }

    #[test]
    fn streak_date_gap_rules() {
        let today = date(2025, 3, 10);
        assert_eq!(next_streak(None, today), 1);
        assert_eq!(next_streak(Some(&stats(0, None)), today), 1);
        assert_eq!(next_streak(Some(&stats(2, Some(today))), today), 2);
        assert_eq!(next_streak(Some(&stats(2, Some(date(2025, 3, 9)))), today), 3);
        assert_eq!(next_streak(Some(&stats(5, Some(date(2025, 3, 8)))), today), 1);
        assert_eq!(next_streak(Some(&stats(4, Some(date(2025, 3, 12)))), today), 4);
    }

    #[test]
    fn streak_crosses_month_boundary() {
        let prior = stats(6, Some(date(2025, 2, 28)));
        assert_eq!(next_streak(Some(&prior), date(2025, 3, 1)), 7);
    }

    #[test]
    fn first_completion_awards_first_task_and_points() {
        let rewards = evaluate_completion(None, date(2025, 3, 10), 2, 1);
        assert_eq!(rewards.stats.reward_points, REWARD_POINTS_PER_TASK);
        assert_eq!(rewards.stats.streak, 1);
        assert_eq!(rewards.stats.last_completed_date, Some(date(2025, 3, 10)));
        assert_eq!(rewards.qualifying_badges, vec![BADGE_FIRST_TASK]);
    }

    #[test]
    fn streak_badges_fire_on_exact_values() {
        let third_day = evaluate_completion(Some(&stats(2, Some(date(2025, 3, 9)))), date(2025, 3, 10), 1, 5);
        assert_eq!(third_day.qualifying_badges, vec![BADGE_STREAK_3]);

        let fourth_day = evaluate_completion(Some(&stats(3, Some(date(2025, 3, 9)))), date(2025, 3, 10), 1, 6);
        assert!(fourth_day.qualifying_badges.is_empty());

        let seventh_day = evaluate_completion(Some(&stats(6, Some(date(2025, 3, 9)))), date(2025, 3, 10), 1, 7);
        assert_eq!(seventh_day.qualifying_badges, vec![BADGE_STREAK_7]);
    }

    #[test]
    fn tenth_task_and_hard_worker() {
        let rewards = evaluate_completion(Some(&stats(1, Some(date(2025, 3, 10)))), date(2025, 3, 10), 3, 10);
        assert_eq!(rewards.qualifying_badges, vec![BADGE_TEN_TASKS, BADGE_HARD_WORKER]);
        assert_eq!(rewards.stats.reward_points, 50);
    }

    #[test]
    fn every_badge_code_is_in_catalog() {
        for code in [BADGE_FIRST_TASK, BADGE_STREAK_3, BADGE_STREAK_7, BADGE_TEN_TASKS, BADGE_HARD_WORKER] {
            assert!(find_badge(code).is_some(), "{code}");
        }
        assert!(find_badge("unknown").is_none());
    }

    #[test]
    fn motivational_message_tiers() {
        assert!(motivational_message(7, 9).contains("hot streak"));
        assert!(motivational_message(3, 3).contains("Keep your streak"));
        assert!(motivational_message(1, 1).contains("Every step counts"));
        assert!(motivational_message(0, 0).contains("first win"));
    }
}
