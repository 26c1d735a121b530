use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Local;
use serde::Deserialize;

use perch_clock::{ClockError, ClockStatus};

use super::{validate_user, AppState};

/// Human-readable local time in the punch action receipts,
/// e.g. `03:04pm, Mon, Jan 2, 2006`.
const RECEIPT_FORMAT: &str = "%I:%M%P, %a, %b %-d, %Y";

#[derive(Debug, Deserialize)]
pub struct PunchParams {
    pub user: Option<String>,
    /// Overrides the configured daily work-hours target (status only).
    pub hours: Option<f64>,
}

pub async fn punch_in(
    State(state): State<AppState>,
    Query(params): Query<PunchParams>,
) -> Result<(StatusCode, String), (StatusCode, String)> {
    let user = require_user(&params)?;
    let now = Local::now().naive_local();

    state.clock.punch_in(user, now).map_err(clock_error)?;

    Ok((
        StatusCode::CREATED,
        format!("PUNCH IN AT {}\n", now.format(RECEIPT_FORMAT)),
    ))
}

pub async fn break_start(
    State(state): State<AppState>,
    Query(params): Query<PunchParams>,
) -> Result<(StatusCode, String), (StatusCode, String)> {
    let user = require_user(&params)?;
    let now = Local::now().naive_local();

    state.clock.break_start(user, now).map_err(clock_error)?;

    Ok((
        StatusCode::CREATED,
        format!("BREAK STARTED AT {}\n", now.format(RECEIPT_FORMAT)),
    ))
}

pub async fn break_end(
    State(state): State<AppState>,
    Query(params): Query<PunchParams>,
) -> Result<(StatusCode, String), (StatusCode, String)> {
    let user = require_user(&params)?;
    let now = Local::now().naive_local();

    state.clock.break_end(user, now).map_err(clock_error)?;

    Ok((
        StatusCode::CREATED,
        format!("BREAK ENDED AT {}\n", now.format(RECEIPT_FORMAT)),
    ))
}

pub async fn punch_out(
    State(state): State<AppState>,
    Query(params): Query<PunchParams>,
) -> Result<(StatusCode, String), (StatusCode, String)> {
    let user = require_user(&params)?;
    let now = Local::now().naive_local();

    state.clock.punch_out(user, now).map_err(clock_error)?;

    Ok((
        StatusCode::CREATED,
        format!("PUNCH OUT AT {}\n", now.format(RECEIPT_FORMAT)),
    ))
}

pub async fn status(
    State(state): State<AppState>,
    Query(params): Query<PunchParams>,
) -> Result<Json<ClockStatus>, (StatusCode, String)> {
    let user = require_user(&params)?;
    let target_hours = params.hours.unwrap_or(state.work_hours);

    let status = state
        .clock
        .status(user, target_hours, Local::now().naive_local())
        .map_err(clock_error)?;

    Ok(Json(status))
}

fn require_user(params: &PunchParams) -> Result<&str, (StatusCode, String)> {
    let user = params.user.as_deref().ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            "parameter `user` is required".to_string(),
        )
    })?;
    validate_user(user)?;
    Ok(user)
}

fn clock_error(err: ClockError) -> (StatusCode, String) {
    if err.is_conflict() {
        (StatusCode::CONFLICT, err.to_string())
    } else {
        tracing::error!("punch action failed: {}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}
