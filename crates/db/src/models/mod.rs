//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row plus the DTOs used for inserts and API responses.

pub mod conversation;
pub mod user;
