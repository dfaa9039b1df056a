//! Handlers for the `/conversations` resource.
//!
//! Every operation is scoped by the authenticated identity's user id; a
//! conversation owned by someone else is indistinguishable from one that
//! does not exist. Creation and deletion go through the ownership
//! coordinator so the `chat_ids` mirror stays consistent.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use parley_core::conversation::Message;
use parley_core::error::CoreError;
use parley_core::types::ChatId;
use parley_db::models::conversation::Conversation;
use parley_db::ownership::OwnershipCoordinator;
use parley_db::repositories::ConversationRepo;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /conversations`. The chat id is optional; the
/// service generates one when absent.
#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    pub chat_id: Option<ChatId>,
}

/// POST /api/v1/conversations
///
/// Create an empty conversation owned by the caller. 409 when the caller
/// already has a conversation with this chat id.
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<CreateConversationRequest>,
) -> AppResult<(StatusCode, Json<Conversation>)> {
    let chat_id = input.chat_id.unwrap_or_else(Uuid::now_v7);

    let conversation =
        OwnershipCoordinator::create_conversation(&state.pool, auth_user.user_id, chat_id).await?;
    tracing::info!(user_id = %auth_user.user_id, %chat_id, "created conversation");

    Ok((StatusCode::CREATED, Json(conversation)))
}

/// GET /api/v1/conversations
///
/// List the caller's conversations, most recently created first.
pub async fn list(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Conversation>>>> {
    let conversations = ConversationRepo::list_for_owner(&state.pool, auth_user.user_id).await?;
    Ok(Json(DataResponse {
        data: conversations,
    }))
}

/// GET /api/v1/conversations/{chat_id}
///
/// Fetch one owned conversation, message log included.
pub async fn get(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(chat_id): Path<ChatId>,
) -> AppResult<Json<DataResponse<Conversation>>> {
    let conversation =
        ConversationRepo::get_by_id_for_owner(&state.pool, chat_id, auth_user.user_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "conversation",
                id: chat_id,
            }))?;

    Ok(Json(DataResponse { data: conversation }))
}

/// PUT /api/v1/conversations/{chat_id}/messages
///
/// Append a message to an owned conversation's log and return the updated
/// conversation. 400 on a malformed or empty message body, 404 when no
/// matching owned conversation exists.
pub async fn append_message(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(chat_id): Path<ChatId>,
    message: Result<Json<Message>, JsonRejection>,
) -> AppResult<Json<DataResponse<Conversation>>> {
    // Surface body-shape failures (unknown role, missing fields) as 400
    // rather than the extractor's 422.
    let Json(message) = message.map_err(|e| {
        AppError::Core(CoreError::Validation(format!("Malformed message: {e}")))
    })?;

    if message.content.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Message content must not be empty".into(),
        )));
    }

    // Single UPDATE ... RETURNING: the log comes back in the same statement
    // that appended, so a concurrent delete cannot slip between a
    // successful append and the response.
    let conversation =
        ConversationRepo::append_message(&state.pool, chat_id, auth_user.user_id, &message)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "conversation",
                id: chat_id,
            }))?;

    Ok(Json(DataResponse { data: conversation }))
}

/// DELETE /api/v1/conversations/{chat_id}
///
/// Delete an owned conversation. Returns 204 No Content; 404 when no
/// matching owned conversation exists.
pub async fn delete(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(chat_id): Path<ChatId>,
) -> AppResult<StatusCode> {
    OwnershipCoordinator::delete_conversation(&state.pool, auth_user.user_id, chat_id).await?;
    tracing::info!(user_id = %auth_user.user_id, %chat_id, "deleted conversation");
    Ok(StatusCode::NO_CONTENT)
}
