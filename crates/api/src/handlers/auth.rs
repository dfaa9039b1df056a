//! Handlers for the `/auth` resource (register, login, refresh).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use parley_core::error::CoreError;
use parley_core::types::UserId;
use parley_db::models::user::CreateUser;
use parley_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{generate_access_token, generate_refresh_token, validate_refresh_token};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Minimum password length enforced at registration.
const MIN_PASSWORD_LENGTH: usize = 8;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register` and `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user_id: UserId,
    pub username: String,
    pub token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Response for `POST /auth/refresh`: a fresh access token only. Refresh
/// tokens are not rotated.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
    pub expires_in: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create an account and log it in. Returns 201 with both tokens, 400 on a
/// malformed username or weak password, 409 when the username is taken.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<CredentialsRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    validate_username(&input.username)?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    if UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Username already exists".into(),
        )));
    }

    let hashed = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create_dto = CreateUser {
        username: input.username,
        password_hash: hashed,
    };

    // The uq_users_username constraint backstops the pre-check above, so a
    // registration race still ends in 409 rather than two accounts.
    let user = UserRepo::create(&state.pool, &create_dto).await?;
    tracing::info!(user_id = %user.id, "registered new user");

    let response = build_auth_response(&state, user.id, &user.username)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
///
/// Authenticate with username + password. An unknown username and a wrong
/// password return byte-identical 401 responses, so callers cannot probe
/// which accounts exist.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<CredentialsRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !verify_password(&input.password, &user.password_hash) {
        return Err(invalid_credentials());
    }

    let response = build_auth_response(&state, user.id, &user.username)?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for a new access token. The subject must
/// still exist; its current identity (post-rename username included) is
/// re-derived from the user row, not from the old token.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<RefreshResponse>> {
    let claims = validate_refresh_token(&input.refresh_token, &state.config.jwt)
        .map_err(|_| invalid_refresh_token())?;

    let user = UserRepo::find_by_id(&state.pool, claims.sub)
        .await?
        .ok_or_else(invalid_refresh_token)?;

    let token = generate_access_token(user.id, &user.username, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(Json(RefreshResponse {
        token,
        expires_in: state.config.jwt.access_token_expiry_hours * 3600,
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The reference domain uses phone numbers as usernames: exactly 11 ASCII
/// digits.
fn validate_username(username: &str) -> Result<(), AppError> {
    if username.len() != 11 || !username.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::Core(CoreError::Validation(
            "Username must be exactly 11 digits".into(),
        )));
    }
    Ok(())
}

/// Uniform failure for unknown-user and wrong-password logins.
fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid username or password".into(),
    ))
}

/// Uniform failure for every way a refresh can go wrong (malformed, expired,
/// subject deleted).
fn invalid_refresh_token() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid or expired refresh token".into(),
    ))
}

/// Generate both token classes and build the response body.
fn build_auth_response(
    state: &AppState,
    user_id: UserId,
    username: &str,
) -> Result<AuthResponse, AppError> {
    let token = generate_access_token(user_id, username, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    let refresh_token = generate_refresh_token(user_id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(AuthResponse {
        user_id,
        username: username.to_string(),
        token,
        refresh_token,
        expires_in: state.config.jwt.access_token_expiry_hours * 3600,
    })
}
