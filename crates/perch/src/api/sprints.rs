use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Json;
use chrono_tz::Tz;
use serde::Serialize;

use perch_sprints::{analytics, BestCategory, ProgressRange, ProgressStats, Sprint, SprintError};

use super::{validate_user, AppState};

pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Sprint>>, (StatusCode, String)> {
    let user = bearer_user(&headers)?;

    let sprints = state.sprints.list(&user).map_err(sprint_error)?;

    Ok(Json(sprints))
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(sprint): Json<Sprint>,
) -> Result<StatusCode, (StatusCode, String)> {
    let user = bearer_user(&headers)?;

    state.sprints.create(&user, sprint).map_err(sprint_error)?;

    Ok(StatusCode::CREATED)
}

pub async fn content(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<String, (StatusCode, String)> {
    let user = bearer_user(&headers)?;

    state.sprints.content(&user, id).map_err(sprint_error)
}

pub async fn update_tags(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(tags): Json<Vec<String>>,
) -> Result<StatusCode, (StatusCode, String)> {
    let user = bearer_user(&headers)?;

    state
        .sprints
        .update_tags(&user, id, tags)
        .map_err(sprint_error)?;

    Ok(StatusCode::OK)
}

pub async fn best(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(category): Path<String>,
) -> Result<Json<Option<Sprint>>, (StatusCode, String)> {
    let user = bearer_user(&headers)?;
    let category: BestCategory = category
        .parse::<BestCategory>()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let best = state.sprints.best(&user, category).map_err(sprint_error)?;

    Ok(Json(best))
}

#[derive(Debug, Serialize)]
pub struct StreakLength {
    pub length: usize,
}

pub async fn best_streak(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StreakLength>, (StatusCode, String)> {
    let user = bearer_user(&headers)?;
    let tz = timezone(&headers);

    let length = state
        .sprints
        .longest_streak(&user, tz)
        .map_err(sprint_error)?;

    Ok(Json(StreakLength { length }))
}

pub async fn progress(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(range): Path<String>,
) -> Result<Json<ProgressStats>, (StatusCode, String)> {
    let user = bearer_user(&headers)?;
    let tz = timezone(&headers);
    let range: ProgressRange = range
        .parse::<ProgressRange>()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let stats = state
        .sprints
        .progress(&user, range, tz)
        .map_err(sprint_error)?;

    Ok(Json(stats))
}

/// The caller identity is an opaque bearer token.
fn bearer_user(headers: &HeaderMap) -> Result<String, (StatusCode, String)> {
    let user = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("")
        .trim();
    if user.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "User not specified".to_string()));
    }
    validate_user(user)?;
    Ok(user.to_string())
}

/// Calendar-day boundaries follow the caller's `X-Timezone` header; an
/// absent or unknown name means UTC.
fn timezone(headers: &HeaderMap) -> Tz {
    headers
        .get("X-Timezone")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(analytics::resolve_timezone)
        .unwrap_or(Tz::UTC)
}

fn sprint_error(err: SprintError) -> (StatusCode, String) {
    match err {
        SprintError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        _ => {
            tracing::error!("sprint request failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}
