//! Shared handler state.

use chrono::{DateTime, Utc};
use parley_core::Orchestrator;
use parley_protocol::ProviderInfo;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
    /// Captured once at startup; provider settings never change at runtime.
    pub provider_info: ProviderInfo,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        let provider_info = orchestrator.provider_info();
        Self {
            orchestrator,
            provider_info,
            started_at: Utc::now(),
        }
    }

    /// Whole seconds since startup.
    pub fn uptime_seconds(&self) -> u64 {
        Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
            .max(0) as u64
    }
}
