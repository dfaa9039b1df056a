//! Route definitions for the `/users` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users` (all require auth).
///
/// ```text
/// GET    /me           -> profile
/// DELETE /me           -> delete account (cascades to conversations)
/// PUT    /me/username  -> change username
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(users::get_me).delete(users::delete_me))
        .route("/me/username", put(users::update_username))
}
