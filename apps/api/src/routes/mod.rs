pub mod health;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::auth::handlers as auth_handlers;
use crate::history::handlers as history_handlers;
use crate::matching::handlers as match_handlers;
use crate::optimize::handlers as optimize_handlers;
use crate::profile::handlers as profile_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profile
        .route("/api/v1/profile", get(profile_handlers::handle_get_profile))
        .route("/api/v1/profile", put(profile_handlers::handle_edit_profile))
        .route(
            "/api/v1/profile/import",
            post(profile_handlers::handle_import),
        )
        // Identity (stub)
        .route("/api/v1/auth/sign-in", post(auth_handlers::handle_sign_in))
        .route(
            "/api/v1/auth/sign-out",
            post(auth_handlers::handle_sign_out),
        )
        .route("/api/v1/auth/me", get(auth_handlers::handle_me))
        .route("/api/v1/auth/avatar", patch(auth_handlers::handle_avatar))
        // Match session
        .route("/api/v1/match", post(match_handlers::handle_start_match))
        .route("/api/v1/match", get(match_handlers::handle_get_match))
        .route("/api/v1/match", delete(match_handlers::handle_reset))
        .route("/api/v1/match/refresh", post(match_handlers::handle_refresh))
        // Optimization sessions
        .route("/api/v1/optimize", post(optimize_handlers::handle_open))
        .route("/api/v1/optimize/:id", get(optimize_handlers::handle_get))
        .route(
            "/api/v1/optimize/:id/diagnose",
            post(optimize_handlers::handle_diagnose),
        )
        .route(
            "/api/v1/optimize/:id/deep",
            post(optimize_handlers::handle_deep_rewrite),
        )
        .route(
            "/api/v1/optimize/:id",
            delete(optimize_handlers::handle_close),
        )
        // History archive
        .route("/api/v1/history", post(history_handlers::handle_save))
        .route("/api/v1/history", get(history_handlers::handle_list))
        .route(
            "/api/v1/history/:id/restore",
            post(history_handlers::handle_restore),
        )
        .with_state(state)
}
