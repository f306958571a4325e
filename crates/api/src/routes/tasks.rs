use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tasks;
use crate::state::AppState;

/// Task routes mounted at `/tasks`.
///
/// ```text
/// POST /                    -> create_task
/// POST /breakdown           -> preview_breakdown
/// GET  /{id}/current-step   -> get_current_step
/// POST /{id}/mark-done      -> mark_done
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(tasks::create_task))
        .route("/breakdown", post(tasks::preview_breakdown))
        .route("/{id}/current-step", get(tasks::get_current_step))
        .route("/{id}/mark-done", post(tasks::mark_done))
}
