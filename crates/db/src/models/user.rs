//! User entity model and DTOs.

use parley_core::types::{ChatId, Timestamp, UserId};
use serde::Serialize;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses
/// directly. Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    /// Insertion-ordered conversation ids owned by this user. Mirrors the
    /// `conversations` rows with `owner_id = id`.
    pub chat_ids: sqlx::types::Json<Vec<ChatId>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub user_id: UserId,
    pub username: String,
    pub chat_ids: Vec<ChatId>,
    pub created_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            chat_ids: user.chat_ids.0,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user. The id is generated by the repository.
#[derive(Debug)]
pub struct CreateUser {
    pub username: String,
    pub password_hash: String,
}
