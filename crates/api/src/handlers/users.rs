//! Handlers for the `/users/me` resource.
//!
//! The target user is always the authenticated identity; there is no path
//! that reads or mutates another account.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use parley_core::error::CoreError;
use parley_core::types::UserId;
use parley_db::models::user::UserResponse;
use parley_db::ownership::OwnershipCoordinator;
use parley_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /users/me/username`.
#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub new_username: String,
}

/// Response body for `PUT /users/me/username`.
#[derive(Debug, Serialize)]
pub struct RenameResponse {
    pub user_id: UserId,
    pub username: String,
}

/// GET /api/v1/users/me
///
/// Return the authenticated user's profile (never the password hash).
pub async fn get_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(user_gone)?;

    Ok(Json(DataResponse { data: user.into() }))
}

/// PUT /api/v1/users/me/username
///
/// Change the authenticated user's username. 400 on a malformed name, 409
/// when it is already taken by someone else.
pub async fn update_username(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<RenameRequest>,
) -> AppResult<Json<RenameResponse>> {
    if input.new_username.len() != 11 || !input.new_username.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::Core(CoreError::Validation(
            "Username must be exactly 11 digits".into(),
        )));
    }

    if let Some(existing) = UserRepo::find_by_username(&state.pool, &input.new_username).await? {
        if existing.id != auth_user.user_id {
            return Err(AppError::Core(CoreError::Conflict(
                "Username already in use".into(),
            )));
        }
    }

    // The unique constraint backstops the pre-check; a lost race surfaces
    // as 409 via the sqlx error classification.
    let renamed = UserRepo::rename(&state.pool, auth_user.user_id, &input.new_username).await?;
    if !renamed {
        return Err(user_gone());
    }

    Ok(Json(RenameResponse {
        user_id: auth_user.user_id,
        username: input.new_username,
    }))
}

/// DELETE /api/v1/users/me
///
/// Delete the authenticated account. All owned conversations cascade with
/// it. Returns 204 No Content.
pub async fn delete_me(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let deleted = OwnershipCoordinator::delete_user(&state.pool, auth_user.user_id).await?;
    if !deleted {
        return Err(user_gone());
    }
    tracing::info!(user_id = %auth_user.user_id, "deleted user account");
    Ok(StatusCode::NO_CONTENT)
}

/// The token verified but its subject is gone: unauthenticated, uniformly.
fn user_gone() -> AppError {
    AppError::Core(CoreError::Unauthorized("User no longer exists".into()))
}
