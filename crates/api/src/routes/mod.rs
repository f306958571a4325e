pub mod health;
pub mod tasks;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree. Every route requires a Bearer token.
///
/// ```text
/// /user/profile                     get, put
/// /user/stats                       get
///
/// /tasks                            create (POST)
/// /tasks/breakdown                  preview (POST)
/// /tasks/{id}/current-step          current step + progress (GET)
/// /tasks/{id}/mark-done             advance (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/user", user::router())
        .nest("/tasks", tasks::router())
}
