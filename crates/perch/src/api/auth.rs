use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use perch_auth::AuthError;

use super::{validate_user, AppState};

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(creds): Json<Credentials>,
) -> Result<StatusCode, (StatusCode, String)> {
    validate_user(&creds.username)?;
    if creds.password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "password must not be empty".to_string(),
        ));
    }

    state
        .auth
        .register(&creds.username, &creds.password)
        .map_err(auth_error)?;

    Ok(StatusCode::CREATED)
}

pub async fn login(
    State(state): State<AppState>,
    Json(creds): Json<Credentials>,
) -> Result<StatusCode, (StatusCode, String)> {
    validate_user(&creds.username)?;

    state
        .auth
        .login(&creds.username, &creds.password)
        .map_err(auth_error)?;

    Ok(StatusCode::OK)
}

fn auth_error(err: AuthError) -> (StatusCode, String) {
    match err {
        AuthError::UsernameTaken => (StatusCode::CONFLICT, err.to_string()),
        AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, err.to_string()),
        _ => {
            tracing::error!("auth request failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}
