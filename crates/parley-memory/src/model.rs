//! Conversation turn, transcript snapshot, and statistics models.

use crate::error::MemoryError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Speaker role for a turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System-provided instruction.
    System,
    /// User-authored message.
    User,
    /// Assistant reply.
    Assistant,
}

impl Role {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = MemoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(MemoryError::UnknownRole(other.to_string())),
        }
    }
}

/// One role-tagged message in a transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Read-only snapshot of a session's transcript.
///
/// Snapshots are detached copies; the store remains the only owner of the
/// live transcript and all mutation goes through its operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    session_id: String,
    turns: Vec<Turn>,
    created_at: DateTime<Utc>,
    last_accessed_at: DateTime<Utc>,
}

impl Transcript {
    pub(crate) fn new(
        session_id: String,
        turns: Vec<Turn>,
        created_at: DateTime<Utc>,
        last_accessed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id,
            turns,
            created_at,
            last_accessed_at,
        }
    }

    /// Session key this transcript belongs to.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Turns in conversation order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// When the owning entry was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Access time recorded by the lookup that produced this snapshot.
    pub fn last_accessed_at(&self) -> DateTime<Utc> {
        self.last_accessed_at
    }

    /// Consume the snapshot and return its turns.
    pub fn into_turns(self) -> Vec<Turn> {
        self.turns
    }
}

/// Cache statistics reported by the store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryStats {
    /// Live (non-expired) sessions at the time of the call.
    pub current_size: usize,
    /// Maximum number of sessions held at once.
    pub max_size: usize,
    /// Idle time after which a session expires.
    pub ttl_seconds: u64,
}
