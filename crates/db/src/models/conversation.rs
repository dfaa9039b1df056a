//! Conversation entity model.

use parley_core::conversation::Message;
use parley_core::types::{ChatId, Timestamp, UserId};
use serde::Serialize;
use sqlx::FromRow;

/// A conversation row from the `conversations` table.
///
/// `content` is an append-only ordered message log stored as JSONB.
/// Rows are only ever reachable through owner-scoped queries, so
/// serializing `owner_id` never exposes another user's data.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Conversation {
    pub chat_id: ChatId,
    pub owner_id: UserId,
    pub content: sqlx::types::Json<Vec<Message>>,
    pub created_at: Timestamp,
}
