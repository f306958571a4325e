//! Stored user profile model.

use microwins_core::error::CoreError;
use microwins_core::profile::UserProfile;
use microwins_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `user_profiles` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserProfileRow {
    pub user_id: String,
    pub neurodivergence: String,
    pub break_interval_minutes: i32,
    pub fatigue_triggers: Vec<String>,
    pub tones: Vec<String>,
    pub verbosity: i32,
    pub step_granularity: String,
    pub updated_at: Timestamp,
}

impl TryFrom<UserProfileRow> for UserProfile {
    type Error = CoreError;

    fn try_from(row: UserProfileRow) -> Result<Self, Self::Error> {
        Ok(UserProfile {
            neurodivergence: row.neurodivergence.parse()?,
            break_interval_minutes: row.break_interval_minutes,
            fatigue_triggers: row.fatigue_triggers,
            tones: row.tones,
            verbosity: row.verbosity,
            step_granularity: row.step_granularity.parse()?,
        })
    }
}
