//! Message types stored in a conversation's content log.

use serde::{Deserialize, Serialize};

/// Participant tag on a stored message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A single message in a conversation log.
///
/// Messages are immutable once appended: the content column is append-only
/// and individual entries are never edited or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}
