//! Repository for the `users` table.

use parley_core::types::{ChatId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, password_hash, chat_ids, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user with a freshly generated UUID v7 id, returning the
    /// created row.
    ///
    /// A duplicate username violates `uq_users_username` and surfaces as a
    /// database error with code 23505.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (id, username, password_hash)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(Uuid::now_v7())
            .bind(&input.username)
            .bind(&input.password_hash)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: UserId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username (case-sensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Change a user's username. Returns `false` if no row with the given
    /// `id` exists.
    ///
    /// Callers pre-check name availability; the unique constraint backstops
    /// the check-then-write race.
    pub async fn rename(
        pool: &PgPool,
        id: UserId,
        new_username: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET username = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(new_username)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Append a chat id to the user's owned set, preserving insertion order.
    ///
    /// Takes a generic executor so the ownership coordinator can run this in
    /// the same transaction as the conversation insert. Returns `false` if
    /// the user does not exist.
    pub async fn add_owned_chat<'e, E>(
        executor: E,
        id: UserId,
        chat_id: ChatId,
    ) -> Result<bool, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE users
             SET chat_ids = chat_ids || to_jsonb($2::uuid), updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(chat_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a chat id from the user's owned set. Returns `false` if the
    /// user does not exist.
    pub async fn remove_owned_chat<'e, E>(
        executor: E,
        id: UserId,
        chat_id: ChatId,
    ) -> Result<bool, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        // jsonb - text removes every matching string element from the array.
        let result = sqlx::query(
            "UPDATE users
             SET chat_ids = chat_ids - $2, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(chat_id.to_string())
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user. The foreign key on `conversations.owner_id` cascades,
    /// removing every conversation the user owned.
    ///
    /// Returns `true` if the row was deleted.
    pub async fn delete(pool: &PgPool, id: UserId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
