//! Repository for the `user_stats` table.

use chrono::NaiveDate;
use sqlx::PgConnection;

use crate::models::user_stats::UserStatsRow;

const COLUMNS: &str = "user_id, reward_points, streak, last_completed_date, updated_at";

pub struct UserStatsRepo;

impl UserStatsRepo {
    pub async fn find(conn: &mut PgConnection, user_id: &str) -> Result<Option<UserStatsRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_stats WHERE user_id = $1");
        sqlx::query_as::<_, UserStatsRow>(&query)
            .bind(user_id)
            .fetch_optional(conn)
            .await
    }

    /// Create the user's zeroed stats row if it is missing, then lock it
    /// for the rest of the transaction.
    pub async fn find_for_update(conn: &mut PgConnection, user_id: &str) -> Result<UserStatsRow, sqlx::Error> {
        sqlx::query("INSERT INTO user_stats (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;

        let query = format!("SELECT {COLUMNS} FROM user_stats WHERE user_id = $1 FOR UPDATE");
        sqlx::query_as::<_, UserStatsRow>(&query)
            .bind(user_id)
            .fetch_one(conn)
            .await
    }

    /// Insert or replace the stats row for a user.
    pub async fn upsert(
        conn: &mut PgConnection,
        user_id: &str,
        reward_points: i64,
        streak: i32,
        last_completed_date: Option<NaiveDate>,
    ) -> Result<UserStatsRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_stats (user_id, reward_points, streak, last_completed_date)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id) DO UPDATE SET
                reward_points = EXCLUDED.reward_points,
                streak = EXCLUDED.streak,
                last_completed_date = EXCLUDED.last_completed_date,
                updated_at = now()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserStatsRow>(&query)
            .bind(user_id)
            .bind(reward_points)
            .bind(streak)
            .bind(last_completed_date)
            .fetch_one(conn)
            .await
    }
}
