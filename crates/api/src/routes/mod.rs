pub mod auth;
pub mod conversations;
pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                        register (public)
/// /auth/login                           login (public)
/// /auth/refresh                         exchange refresh token (public)
///
/// /users/me                             get profile, delete account
/// /users/me/username                    change username (PUT)
///
/// /conversations                        list, create
/// /conversations/{chat_id}              get, delete
/// /conversations/{chat_id}/messages     append message (PUT)
/// ```
///
/// Everything outside `/auth` requires a Bearer access token.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/conversations", conversations::router())
}
