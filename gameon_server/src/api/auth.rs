//! Authentication API handlers.
//!
//! Register a new user:
//! ```bash
//! curl -X POST http://localhost:3000/api/v1/auth/register \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "player1", "password": "Pass123word", "email": "p1@example.com"}'
//! ```

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use gameon::auth::{AuthError, LoginRequest, RegisterRequest};

use super::{ApiError, AppState, ErrorResponse};

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user_id: i64,
    pub username: String,
}

fn auth_error_response(err: AuthError) -> ApiError {
    let status = match &err {
        AuthError::UsernameTaken | AuthError::EmailTaken => StatusCode::CONFLICT,
        AuthError::InvalidUsername(_) | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
        AuthError::InvalidCredentials | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
        AuthError::Hashing(_) | AuthError::Token(_) | AuthError::Store(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("auth error: {err}");
    }
    (
        status,
        Json(ErrorResponse {
            error: err.client_message(),
            code: err.code().to_string(),
        }),
    )
}

/// Register a new user account and immediately log them in.
///
/// Returns `200 OK` with an access token, `409` if the username or email
/// is taken, `400` for weak passwords or malformed usernames.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let username = payload.username.clone();
    let password = payload.password.clone();

    state
        .auth_manager
        .register(payload)
        .await
        .map_err(auth_error_response)?;

    let (user, token) = state
        .auth_manager
        .login(LoginRequest { username, password })
        .await
        .map_err(auth_error_response)?;

    metrics::counter!("auth_registrations_total").increment(1);
    Ok(Json(AuthResponse {
        access_token: token,
        user_id: user.id,
        username: user.username,
    }))
}

/// Authenticate a user and return an access token.
///
/// Returns `401 Unauthorized` for bad credentials without distinguishing
/// unknown usernames from wrong passwords.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (user, token) = state
        .auth_manager
        .login(payload)
        .await
        .map_err(auth_error_response)?;

    metrics::counter!("auth_logins_total").increment(1);
    Ok(Json(AuthResponse {
        access_token: token,
        user_id: user.id,
        username: user.username,
    }))
}
