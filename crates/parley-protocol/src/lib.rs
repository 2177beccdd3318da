//! Wire types for the Parley HTTP surface and provider metadata.

use serde::{Deserialize, Serialize};

/// Service name reported by health checks.
pub const SERVICE_NAME: &str = "chatbot-api";

/// Chat submission from a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    /// Client-chosen session identifier.
    pub session_id: String,
    /// User message text.
    pub message: String,
    /// Optional caller identity used to scope the session key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Reply to a chat submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    /// Assistant reply text.
    pub response: String,
    /// Session identifier as submitted by the client.
    pub session_id: String,
}

/// Result of clearing one session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClearResponse {
    pub message: String,
    /// Whether a live session was removed.
    pub cleared: bool,
}

/// Result of clearing every session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClearAllResponse {
    pub message: String,
    /// Number of live sessions removed.
    pub cleared: usize,
}

/// Memory cache statistics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryStatsView {
    pub current_size: usize,
    pub max_size: usize,
    pub ttl_seconds: u64,
}

/// Envelope for the memory statistics endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryStatsResponse {
    pub memory_stats: MemoryStatsView,
}

/// Service health.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    /// `healthy` or `degraded`.
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Root endpoint payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiInfoResponse {
    pub message: String,
    pub version: String,
    pub health: String,
}

/// Static description of the configured LLM provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderInfo {
    /// Provider identifier, e.g. `chatgroq`.
    pub provider: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub description: String,
}

/// Operational status for administrators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminStatusResponse {
    pub provider: ProviderInfo,
    pub provider_healthy: bool,
    pub memory_stats: MemoryStatsView,
    pub uptime_seconds: u64,
    pub uptime_formatted: String,
}

/// Direct provider probe that bypasses session memory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestChatRequest {
    pub message: String,
}

/// Outcome of a provider probe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestChatResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// JSON error body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub detail: String,
}
