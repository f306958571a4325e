//! Handlers for the stored user profile.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use microwins_core::error::CoreError;
use microwins_core::profile::{ProfileInput, UserProfile};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/user/profile
///
/// Returns 404 if the user has not saved a profile yet.
pub async fn get_profile(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let mut session = state.store.begin().await?;
    let profile = session
        .get_profile(&user.user_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "UserProfile",
            id: user.user_id.clone(),
        })?;

    Ok(Json(DataResponse { data: profile }))
}

/// PUT /api/v1/user/profile
///
/// Validate and store the profile used by breakdown requests that carry
/// no inline profile.
pub async fn update_profile(
    user: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<ProfileInput>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;
    let profile = UserProfile::try_from(input)?;

    let mut session = state.store.begin().await?;
    session.upsert_profile(&user.user_id, &profile).await?;
    session.commit().await?;

    tracing::info!(
        user_id = %user.user_id,
        neurodivergence = %profile.neurodivergence,
        step_granularity = %profile.step_granularity,
        "User profile updated",
    );

    Ok(Json(DataResponse { data: profile }))
}
