use axum::routing::get;
use axum::Router;

use crate::handlers::{profile, stats};
use crate::state::AppState;

/// Per-user routes mounted at `/user`.
///
/// ```text
/// GET /profile  -> get_profile
/// PUT /profile  -> update_profile
/// GET /stats    -> get_stats
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route("/stats", get(stats::get_stats))
}
