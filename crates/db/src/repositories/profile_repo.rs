//! Repository for the `user_profiles` table.

use microwins_core::profile::UserProfile;
use sqlx::PgConnection;

use crate::models::profile::UserProfileRow;

const COLUMNS: &str = "user_id, neurodivergence, break_interval_minutes, fatigue_triggers, \
                       tones, verbosity, step_granularity, updated_at";

pub struct ProfileRepo;

impl ProfileRepo {
    pub async fn find(conn: &mut PgConnection, user_id: &str) -> Result<Option<UserProfileRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_profiles WHERE user_id = $1");
        sqlx::query_as::<_, UserProfileRow>(&query)
            .bind(user_id)
            .fetch_optional(conn)
            .await
    }

    /// Insert or replace a user's profile.
    pub async fn upsert(
        conn: &mut PgConnection,
        user_id: &str,
        profile: &UserProfile,
    ) -> Result<UserProfileRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_profiles
                (user_id, neurodivergence, break_interval_minutes, fatigue_triggers,
                 tones, verbosity, step_granularity)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (user_id) DO UPDATE SET
                neurodivergence = EXCLUDED.neurodivergence,
                break_interval_minutes = EXCLUDED.break_interval_minutes,
                fatigue_triggers = EXCLUDED.fatigue_triggers,
                tones = EXCLUDED.tones,
                verbosity = EXCLUDED.verbosity,
                step_granularity = EXCLUDED.step_granularity,
                updated_at = now()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserProfileRow>(&query)
            .bind(user_id)
            .bind(profile.neurodivergence.as_str())
            .bind(profile.break_interval_minutes)
            .bind(&profile.fatigue_triggers)
            .bind(&profile.tones)
            .bind(profile.verbosity)
            .bind(profile.step_granularity.as_str())
            .fetch_one(conn)
            .await
    }
}
