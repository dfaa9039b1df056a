//! Ownership coordinator for two-repository mutations.
//!
//! Creating or deleting a conversation touches both the `conversations`
//! table and the owner's `chat_ids` mirror. Both writes run inside one
//! transaction so the mirror invariant holds across crashes: `chat_ids` is
//! always exactly the set of conversation ids whose `owner_id` equals the
//! user's id.

use parley_core::types::{ChatId, UserId};
use sqlx::PgPool;

use crate::models::conversation::Conversation;
use crate::repositories::{ConversationRepo, UserRepo};

/// PostgreSQL error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, thiserror::Error)]
pub enum OwnershipError {
    /// The claimed owner does not exist (e.g. a stale token referencing a
    /// deleted user).
    #[error("User not found: {0}")]
    UnknownUser(UserId),

    /// The owner already has a conversation with this chat id.
    #[error("Conversation {chat_id} already exists for user {owner_id}")]
    DuplicateChat { owner_id: UserId, chat_id: ChatId },

    /// No conversation with this chat id is owned by the user. Deliberately
    /// identical for "absent" and "owned by someone else".
    #[error("No conversation {chat_id} owned by user {owner_id}")]
    NotOwned { owner_id: UserId, chat_id: ChatId },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Stateless orchestrator for cross-repository ownership mutations.
pub struct OwnershipCoordinator;

impl OwnershipCoordinator {
    /// Create an empty conversation for `owner_id` and mirror its id into
    /// the owner's `chat_ids`, atomically.
    pub async fn create_conversation(
        pool: &PgPool,
        owner_id: UserId,
        chat_id: ChatId,
    ) -> Result<Conversation, OwnershipError> {
        // Re-validate existence: token claims may outlive the account.
        let user = UserRepo::find_by_id(pool, owner_id)
            .await?
            .ok_or(OwnershipError::UnknownUser(owner_id))?;

        if user.chat_ids.0.contains(&chat_id) {
            return Err(OwnershipError::DuplicateChat { owner_id, chat_id });
        }

        let mut tx = pool.begin().await?;

        let conversation = match ConversationRepo::create(&mut *tx, chat_id, owner_id).await {
            Ok(conversation) => conversation,
            // The pre-check can lose a race; the composite primary key wins it.
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                return Err(OwnershipError::DuplicateChat { owner_id, chat_id });
            }
            Err(e) => return Err(e.into()),
        };

        if !UserRepo::add_owned_chat(&mut *tx, owner_id, chat_id).await? {
            // Owner row vanished between the existence check and the mirror
            // update. Rolling back keeps both sides consistent.
            tracing::error!(%owner_id, %chat_id, "chat_ids update failed after conversation insert, rolling back");
            tx.rollback().await?;
            return Err(OwnershipError::UnknownUser(owner_id));
        }

        tx.commit().await?;
        Ok(conversation)
    }

    /// Delete an owned conversation and remove its id from the owner's
    /// `chat_ids`, atomically.
    pub async fn delete_conversation(
        pool: &PgPool,
        owner_id: UserId,
        chat_id: ChatId,
    ) -> Result<(), OwnershipError> {
        if UserRepo::find_by_id(pool, owner_id).await?.is_none() {
            return Err(OwnershipError::UnknownUser(owner_id));
        }

        let mut tx = pool.begin().await?;

        if !ConversationRepo::delete(&mut *tx, chat_id, owner_id).await? {
            return Err(OwnershipError::NotOwned { owner_id, chat_id });
        }

        if !UserRepo::remove_owned_chat(&mut *tx, owner_id, chat_id).await? {
            tracing::error!(%owner_id, %chat_id, "chat_ids update failed after conversation delete, rolling back");
            tx.rollback().await?;
            return Err(OwnershipError::UnknownUser(owner_id));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete a user. The `conversations.owner_id` foreign key cascades, so
    /// the row set and the mirror disappear together. Returns `true` if the
    /// user existed.
    pub async fn delete_user(pool: &PgPool, user_id: UserId) -> Result<bool, OwnershipError> {
        Ok(UserRepo::delete(pool, user_id).await?)
    }
}
