//! Earned badge model.

use microwins_core::store::BadgeAward;
use microwins_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `user_badges` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserBadge {
    pub user_id: String,
    pub badge_code: String,
    pub earned_at: Timestamp,
}

impl From<UserBadge> for BadgeAward {
    fn from(row: UserBadge) -> Self {
        BadgeAward {
            badge_code: row.badge_code,
            earned_at: row.earned_at,
        }
    }
}
