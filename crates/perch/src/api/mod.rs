mod auth;
mod punch;
mod sprints;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use perch_auth::AuthStore;
use perch_clock::PunchClock;
use perch_sprints::SprintStore;

#[derive(Clone)]
pub struct AppState {
    pub clock: Arc<PunchClock>,
    pub sprints: Arc<SprintStore>,
    pub auth: Arc<AuthStore>,
    /// Default daily work-hours target for the punch status report.
    pub work_hours: f64,
}

pub fn create_router(
    clock: Arc<PunchClock>,
    sprints: Arc<SprintStore>,
    auth: Arc<AuthStore>,
    work_hours: f64,
) -> Router {
    let state = AppState {
        clock,
        sprints,
        auth,
        work_hours,
    };

    Router::new()
        .route("/api/punch/in", post(punch::punch_in))
        .route("/api/punch/break/start", post(punch::break_start))
        .route("/api/punch/break/end", post(punch::break_end))
        .route("/api/punch/out", post(punch::punch_out))
        .route("/api/punch/status", get(punch::status))
        .route("/api/sprints", get(sprints::list).post(sprints::create))
        .route("/api/sprints/{id}/content", get(sprints::content))
        .route("/api/sprints/{id}/tags", patch(sprints::update_tags))
        .route("/api/sprints/best/{category}", get(sprints::best))
        .route("/api/sprints/best-streak", get(sprints::best_streak))
        .route("/api/sprints/progress/{range}", get(sprints::progress))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Validate a user identifier before it becomes part of a file name.
pub(crate) fn validate_user(user: &str) -> Result<(), (StatusCode, String)> {
    let ok = !user.is_empty()
        && !user.starts_with('.')
        && user
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if ok {
        Ok(())
    } else {
        Err((
            StatusCode::BAD_REQUEST,
            "invalid user identifier".to_string(),
        ))
    }
}
