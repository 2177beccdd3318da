//! Error types for conversation memory operations.

/// Errors returned by the conversation store and its models.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    /// Session id was empty.
    #[error("session id must not be empty")]
    EmptySessionId,
    /// Role string did not name a known speaker.
    #[error("unknown role: {0}")]
    UnknownRole(String),
    /// Store limits were rejected at construction.
    #[error("invalid store limits: {0}")]
    InvalidLimits(String),
}
