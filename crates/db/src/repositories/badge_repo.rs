//! Repository for the `user_badges` table.

use sqlx::PgConnection;

use crate::models::badge::UserBadge;

pub struct BadgeRepo;

impl BadgeRepo {
    /// Award a badge. Returns `false` if the user already had it.
    pub async fn award(conn: &mut PgConnection, user_id: &str, badge_code: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO user_badges (user_id, badge_code) VALUES ($1, $2)
             ON CONFLICT (user_id, badge_code) DO NOTHING",
        )
        .bind(user_id)
        .bind(badge_code)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List a user's badges in the order they were earned.
    pub async fn list_for_user(conn: &mut PgConnection, user_id: &str) -> Result<Vec<UserBadge>, sqlx::Error> {
        sqlx::query_as::<_, UserBadge>(
            "SELECT user_id, badge_code, earned_at FROM user_badges
             WHERE user_id = $1
             ORDER BY earned_at ASC, badge_code ASC",
        )
        .bind(user_id)
        .fetch_all(conn)
        .await
    }
}
