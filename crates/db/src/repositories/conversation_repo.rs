//! Repository for the `conversations` table.
//!
//! Every read and write is scoped by `owner_id`: a conversation owned by a
//! different user is indistinguishable from a nonexistent one, so no
//! cross-user enumeration path exists at this layer.

use parley_core::conversation::Message;
use parley_core::types::{ChatId, UserId};
use sqlx::PgPool;

use crate::models::conversation::Conversation;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "chat_id, owner_id, content, created_at";

/// Provides owner-scoped operations for conversations.
pub struct ConversationRepo;

impl ConversationRepo {
    /// Insert a new, empty conversation.
    ///
    /// A duplicate `(owner_id, chat_id)` pair violates the composite primary
    /// key and surfaces as a database error with code 23505. Takes a generic
    /// executor so the ownership coordinator can run this in the same
    /// transaction as the `chat_ids` mirror update.
    pub async fn create<'e, E>(
        executor: E,
        chat_id: ChatId,
        owner_id: UserId,
    ) -> Result<Conversation, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO conversations (chat_id, owner_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Conversation>(&query)
            .bind(chat_id)
            .bind(owner_id)
            .fetch_one(executor)
            .await
    }

    /// Fetch a conversation by id, scoped to its owner. The only read path
    /// for a single conversation.
    pub async fn get_by_id_for_owner(
        pool: &PgPool,
        chat_id: ChatId,
        owner_id: UserId,
    ) -> Result<Option<Conversation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM conversations
             WHERE chat_id = $1 AND owner_id = $2"
        );
        sqlx::query_as::<_, Conversation>(&query)
            .bind(chat_id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's conversations, most recently created first. Ties on
    /// `created_at` fall back to the time-ordered chat id.
    pub async fn list_for_owner(
        pool: &PgPool,
        owner_id: UserId,
    ) -> Result<Vec<Conversation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM conversations
             WHERE owner_id = $1
             ORDER BY created_at DESC, chat_id DESC"
        );
        sqlx::query_as::<_, Conversation>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Append a message to a conversation's content log, returning the
    /// updated row.
    ///
    /// A single JSONB concatenation UPDATE with RETURNING, so concurrent
    /// appends serialize on the row lock instead of racing through
    /// read-modify-write, and the returned log is exactly the state this
    /// append produced. Returns `None` if no matching owned conversation
    /// exists.
    pub async fn append_message(
        pool: &PgPool,
        chat_id: ChatId,
        owner_id: UserId,
        message: &Message,
    ) -> Result<Option<Conversation>, sqlx::Error> {
        let query = format!(
            "UPDATE conversations SET content = content || $3
             WHERE chat_id = $1 AND owner_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Conversation>(&query)
            .bind(chat_id)
            .bind(owner_id)
            .bind(sqlx::types::Json(message))
            .fetch_optional(pool)
            .await
    }

    /// Delete a conversation, scoped to its owner. Returns `true` if a row
    /// was deleted.
    pub async fn delete<'e, E>(
        executor: E,
        chat_id: ChatId,
        owner_id: UserId,
    ) -> Result<bool, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM conversations WHERE chat_id = $1 AND owner_id = $2")
            .bind(chat_id)
            .bind(owner_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
