//! Axum route handlers for the history API.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::history::restore_session;
use crate::matching::session::MatchSnapshot;
use crate::models::history::HistoryItem;
use crate::state::AppState;

/// POST /api/v1/history
///
/// Archives the live session. 401 when no identity is attached so the
/// caller can prompt sign-in; 400 when there is nothing worth saving.
pub async fn handle_save(State(state): State<AppState>) -> Result<Json<HistoryItem>, AppError> {
    let identity = state.identity.current().await;

    let (profile, analysis, jobs) = {
        let session = state.session.lock().await;
        (
            session.profile.clone(),
            session.analysis.clone(),
            session.jobs.clone(),
        )
    };

    let item = state
        .history
        .save(identity.as_ref(), profile, analysis, jobs)
        .await?;
    Ok(Json(item))
}

/// GET /api/v1/history
///
/// Newest-first list of archived snapshots.
pub async fn handle_list(State(state): State<AppState>) -> Json<Vec<HistoryItem>> {
    Json(state.history.list().await)
}

/// POST /api/v1/history/:id/restore
///
/// Replaces the live session with the archived snapshot; 409 mid-phase.
pub async fn handle_restore(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchSnapshot>, AppError> {
    let snapshot = restore_session(&state.history, &state.session, id).await?;
    Ok(Json(snapshot))
}
