//! Route definitions for the `/conversations` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::conversations;
use crate::state::AppState;

/// Routes mounted at `/conversations` (all require auth and are scoped to
/// the authenticated owner).
///
/// ```text
/// GET    /                     -> list (most recent first)
/// POST   /                     -> create
/// GET    /{chat_id}            -> get
/// DELETE /{chat_id}            -> delete
/// PUT    /{chat_id}/messages   -> append message
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(conversations::list).post(conversations::create))
        .route(
            "/{chat_id}",
            get(conversations::get).delete(conversations::delete),
        )
        .route("/{chat_id}/messages", put(conversations::append_message))
}
