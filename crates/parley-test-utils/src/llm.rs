use async_trait::async_trait;
use parking_lot::Mutex;
use parley_core::{ChatProvider, ProviderError};
use parley_memory::Turn;
use parley_protocol::ProviderInfo;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Provider metadata shared by the mocks.
pub fn mock_info(name: &str) -> ProviderInfo {
    ProviderInfo {
        provider: name.to_string(),
        model: "mock-model".to_string(),
        base_url: "http://mock.invalid".to_string(),
        temperature: 0.0,
        max_tokens: 16,
        description: "mock provider".to_string(),
    }
}

/// Always answers with the same text.
#[derive(Debug, Clone)]
pub struct FixedLLM {
    response: String,
    healthy: bool,
}

impl FixedLLM {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            healthy: true,
        }
    }

    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }
}

#[async_trait]
impl ChatProvider for FixedLLM {
    async fn generate(&self, _messages: &[Turn]) -> Result<String, ProviderError> {
        Ok(self.response.clone())
    }

    fn info(&self) -> ProviderInfo {
        mock_info("fixed")
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }
}

/// Always fails with the configured error and counts attempts.
#[derive(Debug, Clone)]
pub struct FailingLLM {
    error: ProviderError,
    calls: Arc<AtomicUsize>,
}

impl FailingLLM {
    pub fn new(error: ProviderError) -> Self {
        Self {
            error,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ProviderError::Transport(message.into()))
    }

    pub fn timeout() -> Self {
        Self::new(ProviderError::Timeout)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatProvider for FailingLLM {
    async fn generate(&self, _messages: &[Turn]) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }

    fn info(&self) -> ProviderInfo {
        mock_info("failing")
    }

    async fn health_check(&self) -> bool {
        false
    }
}

/// Answers with fixed text and records every message list it receives.
#[derive(Debug, Clone)]
pub struct RecordingLLM {
    response: String,
    seen: Arc<Mutex<Vec<Vec<Turn>>>>,
}

impl RecordingLLM {
    pub fn new(response: impl Into<String>) -> (Self, Arc<Mutex<Vec<Vec<Turn>>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                response: response.into(),
                seen: seen.clone(),
            },
            seen,
        )
    }
}

#[async_trait]
impl ChatProvider for RecordingLLM {
    async fn generate(&self, messages: &[Turn]) -> Result<String, ProviderError> {
        self.seen.lock().push(messages.to_vec());
        Ok(self.response.clone())
    }

    fn info(&self) -> ProviderInfo {
        mock_info("recording")
    }
}

/// Plays back queued outcomes in order, optionally after a delay.
///
/// Once the script is exhausted every call echoes the last user message.
#[derive(Debug, Clone)]
pub struct ScriptedLLM {
    script: Arc<Mutex<VecDeque<Result<String, ProviderError>>>>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedLLM {
    pub fn new(script: impl IntoIterator<Item = Result<String, ProviderError>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Echo the latest user message on every call.
    pub fn echo() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatProvider for ScriptedLLM {
    async fn generate(&self, messages: &[Turn]) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.script.lock().pop_front();
        match scripted {
            Some(outcome) => outcome,
            None => Ok(messages
                .last()
                .map(|turn| format!("echo: {}", turn.content()))
                .unwrap_or_default()),
        }
    }

    fn info(&self) -> ProviderInfo {
        mock_info("scripted")
    }
}

/// Sleeps for as many milliseconds as the latest message names, then
/// answers `r<message>`. Lets tests control which concurrent call returns first.
#[derive(Debug, Clone, Default)]
pub struct PacedLLM;

#[async_trait]
impl ChatProvider for PacedLLM {
    async fn generate(&self, messages: &[Turn]) -> Result<String, ProviderError> {
        let content = messages.last().map(Turn::content).unwrap_or_default();
        let millis = content.trim().parse::<u64>().map_err(|err| {
            ProviderError::InvalidResponse(format!("unpaced message {content:?}: {err}"))
        })?;
        tokio::time::sleep(Duration::from_millis(millis)).await;
        Ok(format!("r{content}"))
    }

    fn info(&self) -> ProviderInfo {
        mock_info("paced")
    }
}
