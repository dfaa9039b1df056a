/// User primary keys are UUIDs (v7, time-ordered), generated server-side.
pub type UserId = uuid::Uuid;

/// Conversation identifiers. Caller-supplied or generated at creation;
/// unique per owner, not globally.
pub type ChatId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
