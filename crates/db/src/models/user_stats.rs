//! Per-user reward stats model.

use chrono::NaiveDate;
use microwins_core::rewards::UserStats;
use microwins_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `user_stats` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserStatsRow {
    pub user_id: String,
    pub reward_points: i64,
    pub streak: i32,
    pub last_completed_date: Option<NaiveDate>,
    pub updated_at: Timestamp,
}

impl From<UserStatsRow> for UserStats {
    fn from(row: UserStatsRow) -> Self {
        UserStats {
            reward_points: row.reward_points,
            streak: row.streak,
            last_completed_date: row.last_completed_date,
        }
    }
}
