//! Core chat orchestration for Parley.
//!
//! This crate owns the orchestrator that threads session transcripts through
//! an LLM provider, the provider abstraction, and the OpenAI-compatible HTTP
//! client used in production.

pub mod error;
pub mod orchestrator;
pub mod provider;

pub use error::CoreError;
/// Orchestrator facade and per-turn results.
pub use orchestrator::{ChatOptions, ChatReply, Orchestrator, SendHandle};
/// Provider abstraction and the HTTP client implementation.
pub use provider::{ChatProvider, OpenAiCompatibleProvider, ProviderError};
