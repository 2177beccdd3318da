//! Error types for the core orchestrator crate.

use crate::provider::ProviderError;
use parley_memory::MemoryError;
use thiserror::Error;

/// Errors returned by orchestrator operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Caller supplied an empty or oversized message, or an empty session id.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The LLM call failed; the transcript was left untouched.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    /// A spawned turn panicked or was aborted.
    #[error("executor error: {0}")]
    Executor(String),
}

impl From<MemoryError> for CoreError {
    fn from(err: MemoryError) -> Self {
        CoreError::InvalidInput(err.to_string())
    }
}

impl CoreError {
    /// Whether the failure was caused by the request rather than a collaborator.
    pub fn is_client_error(&self) -> bool {
        matches!(self, CoreError::InvalidInput(_))
    }
}
