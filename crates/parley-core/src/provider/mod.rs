//! LLM provider abstraction.

mod openai;

pub use openai::OpenAiCompatibleProvider;

use async_trait::async_trait;
use parley_memory::Turn;
use parley_protocol::ProviderInfo;
use thiserror::Error;

/// Failures reported by a chat provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The request never produced an HTTP response.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The request exceeded the configured timeout.
    #[error("provider request timed out")]
    Timeout,
    /// The provider answered with a non-success status.
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    /// The body could not be decoded or carried no reply.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
    /// The client could not be built from its settings.
    #[error("provider misconfigured: {0}")]
    Config(String),
}

impl ProviderError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderError::Timeout)
    }
}

/// A chat completion backend.
///
/// `generate` receives the full ordered message list (optional system turn,
/// stored transcript, new user turn) and returns the assistant's reply text.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn generate(&self, messages: &[Turn]) -> Result<String, ProviderError>;

    /// Static description surfaced by status endpoints.
    fn info(&self) -> ProviderInfo;

    /// Cheap reachability probe.
    async fn health_check(&self) -> bool {
        true
    }
}
