//! Axum route handlers for the identity API.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::identity::{Identity, Provider};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub provider: Provider,
}

#[derive(Debug, Deserialize)]
pub struct AvatarRequest {
    pub url: String,
}

/// POST /api/v1/auth/sign-in
pub async fn handle_sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<Identity>, AppError> {
    let identity = state.identity.sign_in(request.provider).await?;
    Ok(Json(identity))
}

/// POST /api/v1/auth/sign-out
pub async fn handle_sign_out(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.identity.sign_out().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn handle_me(State(state): State<AppState>) -> Json<Option<Identity>> {
    Json(state.identity.current().await)
}

/// PATCH /api/v1/auth/avatar
pub async fn handle_avatar(
    State(state): State<AppState>,
    Json(request): Json<AvatarRequest>,
) -> Result<Json<Identity>, AppError> {
    if request.url.trim().is_empty() {
        return Err(AppError::Validation("avatar url cannot be empty".to_string()));
    }
    let identity = state.identity.set_avatar(request.url).await?;
    Ok(Json(identity))
}
