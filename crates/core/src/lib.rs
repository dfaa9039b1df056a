//! Shared domain types and errors for the Parley chat backend.

pub mod conversation;
pub mod error;
pub mod types;
