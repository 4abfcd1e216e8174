//! Axum route handlers for the match session API.

use axum::{extract::State, http::StatusCode, Json};

use crate::errors::AppError;
use crate::matching::pipeline::run_match;
use crate::matching::refresh::{refresh_jobs, RefreshResult};
use crate::matching::session::MatchSnapshot;
use crate::state::AppState;

/// POST /api/v1/match
///
/// Snapshots the current profile and runs the full analyze → search
/// pipeline. Returns the ready snapshot; on failure the session is left in
/// `Failed` for inspection via GET.
pub async fn handle_start_match(
    State(state): State<AppState>,
) -> Result<Json<MatchSnapshot>, AppError> {
    let profile = state.profile.snapshot().await;
    let snapshot = run_match(
        &state.session,
        state.intel.as_ref(),
        &state.progress,
        profile,
    )
    .await?;
    Ok(Json(snapshot))
}

/// GET /api/v1/match
///
/// Current session snapshot: phase, analysis, jobs, progress log, transient
/// notice, and the last error if any.
pub async fn handle_get_match(State(state): State<AppState>) -> Json<MatchSnapshot> {
    let session = state.session.lock().await;
    Json(session.snapshot())
}

/// POST /api/v1/match/refresh
///
/// Fetches a non-overlapping batch. 409 while another refresh is in flight.
pub async fn handle_refresh(
    State(state): State<AppState>,
) -> Result<Json<RefreshResult>, AppError> {
    let result = refresh_jobs(&state.session, state.intel.as_ref()).await?;
    Ok(Json(result))
}

/// DELETE /api/v1/match
///
/// Abandons the session: discards analysis, jobs, seen keys, progress, and
/// errors, returning to `Idle`. Nothing is archived implicitly.
pub async fn handle_reset(State(state): State<AppState>) -> StatusCode {
    let mut session = state.session.lock().await;
    session.reset();
    StatusCode::NO_CONTENT
}
