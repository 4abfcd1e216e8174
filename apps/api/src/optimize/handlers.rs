//! Axum route handlers for the optimization API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::JobMatch;
use crate::optimize::{
    close_session, open_session, run_diagnosis, start_deep_rewrite, OptimizationView,
    SharedOptimization,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OpenOptimizationRequest {
    pub job: JobMatch,
}

async fn lookup(state: &AppState, id: Uuid) -> Result<SharedOptimization, AppError> {
    state
        .optimizations
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Optimization session {id} not found")))
}

/// POST /api/v1/optimize
///
/// Opens a session against the current resume and runs the diagnosis.
/// A diagnosis failure is reported inside the view, not as a request error.
pub async fn handle_open(
    State(state): State<AppState>,
    Json(request): Json<OpenOptimizationRequest>,
) -> Result<Json<OptimizationView>, AppError> {
    let resume_text = state.profile.snapshot().await.resume_text;
    let view = open_session(
        &state.optimizations,
        state.intel.as_ref(),
        request.job,
        resume_text,
    )
    .await?;
    Ok(Json(view))
}

/// GET /api/v1/optimize/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OptimizationView>, AppError> {
    let session = lookup(&state, id).await?;
    let view = session.lock().await.view();
    Ok(Json(view))
}

/// POST /api/v1/optimize/:id/diagnose
///
/// Re-runs the diagnosis from scratch, invalidating any fetched steps.
pub async fn handle_diagnose(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OptimizationView>, AppError> {
    let session = lookup(&state, id).await?;
    let view = run_diagnosis(&session, state.intel.as_ref()).await?;
    Ok(Json(view))
}

/// POST /api/v1/optimize/:id/deep
///
/// Fetches rewrite steps and starts the staged reveal.
pub async fn handle_deep_rewrite(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OptimizationView>, AppError> {
    let session = lookup(&state, id).await?;
    let view = start_deep_rewrite(&session, state.intel.as_ref()).await?;
    Ok(Json(view))
}

/// DELETE /api/v1/optimize/:id
pub async fn handle_close(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    close_session(&state.optimizations, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
