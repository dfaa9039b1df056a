//! Request handlers, one module per resource.

pub mod auth;
pub mod conversations;
pub mod users;
