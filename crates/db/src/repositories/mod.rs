//! Repository structs providing table-scoped query methods.

pub mod conversation_repo;
pub mod user_repo;

pub use conversation_repo::ConversationRepo;
pub use user_repo::UserRepo;
