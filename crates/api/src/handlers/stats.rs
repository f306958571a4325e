use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use microwins_core::tasks::stats_summary;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/user/stats
///
/// Totals, reward points, streak, badges and recent completions.
pub async fn get_stats(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let summary = stats_summary(state.store.as_ref(), &user.user_id).await?;
    Ok(Json(DataResponse { data: summary }))
}
