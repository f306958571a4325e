//! Handlers for breakdown generation and task progress.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use microwins_core::breakdown::{BreakdownMode, Step, TaskBreakdown};
use microwins_core::generation::generate_breakdown;
use microwins_core::profile::{ProfileInput, StepGranularity, UserProfile};
use microwins_core::store::TaskRecord;
use microwins_core::tasks;
use microwins_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /tasks/breakdown` and `POST /tasks`.
///
/// Mode selection: an inline `profile` wins; otherwise an explicit
/// `step_granularity` selects the minimal prompt; otherwise the stored
/// profile is used; otherwise the minimal prompt at `normal` granularity.
#[derive(Debug, Deserialize)]
pub struct BreakdownRequest {
    pub task_description: String,
    #[serde(default)]
    pub profile: Option<ProfileInput>,
    #[serde(default)]
    pub step_granularity: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedTask {
    pub task: TaskRecord,
    pub steps: Vec<Step>,
    pub total_minutes: i32,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn resolve_mode(
    state: &AppState,
    user_id: &str,
    request: BreakdownRequest,
) -> AppResult<(String, BreakdownMode)> {
    let BreakdownRequest {
        task_description,
        profile,
        step_granularity,
    } = request;

    if let Some(input) = profile {
        return Ok((task_description, BreakdownMode::Profile(UserProfile::try_from(input)?)));
    }
    if let Some(granularity) = step_granularity {
        let granularity: StepGranularity = granularity.parse()?;
        return Ok((task_description, BreakdownMode::Minimal { granularity }));
    }

    // The session is dropped before the provider call.
    let stored = {
        let mut session = state.store.begin().await?;
        session.get_profile(user_id).await?
    };
    let mode = match stored {
        Some(profile) => BreakdownMode::Profile(profile),
        None => BreakdownMode::Minimal {
            granularity: StepGranularity::Normal,
        },
    };
    Ok((task_description, mode))
}

async fn generate(state: &AppState, user_id: &str, request: BreakdownRequest) -> AppResult<TaskBreakdown> {
    let (description, mode) = resolve_mode(state, user_id, request).await?;
    let breakdown =
        generate_breakdown(state.llm.as_ref(), &description, &mode, &state.generation).await?;

    tracing::info!(
        user_id = %user_id,
        granularity = %mode.granularity(),
        step_count = breakdown.steps.len(),
        difficulty = breakdown.difficulty_level,
        "Breakdown generated",
    );
    Ok(breakdown)
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// POST /api/v1/tasks/breakdown
///
/// Generate a breakdown preview. Nothing is persisted.
pub async fn preview_breakdown(
    user: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<BreakdownRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;
    let breakdown = generate(&state, &user.user_id, input).await?;
    Ok(Json(DataResponse { data: breakdown }))
}

/// POST /api/v1/tasks
///
/// Generate a breakdown and persist it as a new active task.
pub async fn create_task(
    user: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<BreakdownRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;
    let breakdown = generate(&state, &user.user_id, input).await?;
    let task = tasks::create_task(state.store.as_ref(), &user.user_id, &breakdown).await?;

    let data = CreatedTask {
        task,
        total_minutes: breakdown.total_minutes(),
        steps: breakdown.steps,
    };
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/tasks/{id}/current-step
pub async fn get_current_step(
    user: AuthUser,
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(task_id) = path?;
    let current = tasks::current_step(state.store.as_ref(), &user.user_id, task_id).await?;
    Ok(Json(DataResponse { data: current }))
}

/// POST /api/v1/tasks/{id}/mark-done
///
/// Mark the current step done. Marking a completed task again returns the
/// `already_completed` outcome with 200.
pub async fn mark_done(
    user: AuthUser,
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(task_id) = path?;
    let today = Utc::now().date_naive();
    let outcome = tasks::advance_task(state.store.as_ref(), &user.user_id, task_id, today).await?;
    Ok(Json(DataResponse { data: outcome }))
}
