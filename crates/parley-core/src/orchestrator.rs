//! Orchestrator Core

use crate::error::CoreError;
use crate::provider::ChatProvider;
use log::{debug, info, warn};
use parley_config::ChatConfig;
use parley_memory::{ConversationStore, MemoryStats, Transcript, Turn};
use parley_protocol::ProviderInfo;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 4000;

/// Result payload for a single chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    /// Session key the turn was recorded under.
    pub session_id: String,
    /// Assistant response content.
    pub response: String,
}

/// Handle for a turn running on its own task.
///
/// Dropping the handle detaches the task; the provider call and the
/// transcript append still complete.
pub struct SendHandle {
    pub session_id: String,
    handle: JoinHandle<Result<ChatReply, CoreError>>,
}

impl SendHandle {
    /// Await completion of the turn and return its result.
    pub async fn finish(self) -> Result<ChatReply, CoreError> {
        self.handle
            .await
            .map_err(|err| CoreError::Executor(err.to_string()))?
    }
}

/// Per-turn handling knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOptions {
    pub max_message_chars: usize,
    /// Sent ahead of the transcript on every request; never stored.
    pub system_prompt: Option<String>,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
            system_prompt: None,
        }
    }
}

impl From<&ChatConfig> for ChatOptions {
    fn from(config: &ChatConfig) -> Self {
        Self {
            max_message_chars: config.max_message_chars,
            system_prompt: config
                .system_prompt
                .clone()
                .filter(|prompt| !prompt.trim().is_empty()),
        }
    }
}

/// Main orchestration façade: validates turns, threads transcripts through
/// the provider, and exposes session administration.
#[derive(Clone)]
pub struct Orchestrator {
    store: ConversationStore,
    provider: Arc<dyn ChatProvider>,
    options: ChatOptions,
}

impl Orchestrator {
    /// Construct an orchestrator over an injected store and provider.
    pub fn new(store: ConversationStore, provider: Arc<dyn ChatProvider>) -> Self {
        Self::with_options(store, provider, ChatOptions::default())
    }

    pub fn with_options(
        store: ConversationStore,
        provider: Arc<dyn ChatProvider>,
        options: ChatOptions,
    ) -> Self {
        info!(
            "orchestrator ready (provider={}, max_message_chars={}, system_prompt={})",
            provider.info().provider,
            options.max_message_chars,
            options.system_prompt.is_some()
        );
        Self {
            store,
            provider,
            options,
        }
    }

    /// Run a single turn: load the transcript, call the provider, and record
    /// the user message and reply together.
    ///
    /// Validation happens before any store access; a provider failure leaves
    /// the transcript untouched.
    pub async fn send(&self, session_id: &str, message: &str) -> Result<ChatReply, CoreError> {
        self.validate(session_id, message)?;
        let transcript = self.store.get_or_create(session_id)?;
        let user_turn = Turn::user(message);
        let request = self.build_request(transcript.turns(), &user_turn);
        debug!(
            "running chat turn (session_id={}, history_len={}, message_len={})",
            session_id,
            transcript.len(),
            message.len()
        );

        let response = match self.provider.generate(&request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    "provider call failed (session_id={}, error={})",
                    session_id, err
                );
                return Err(err.into());
            }
        };

        self.store
            .append(session_id, [user_turn, Turn::assistant(response.clone())])?;
        debug!(
            "chat turn recorded (session_id={}, reply_len={})",
            session_id,
            response.len()
        );
        Ok(ChatReply {
            session_id: session_id.to_string(),
            response,
        })
    }

    /// Run a turn on a Tokio task so an abandoned caller does not cancel it.
    pub fn spawn_send(
        &self,
        session_id: impl Into<String>,
        message: impl Into<String>,
    ) -> SendHandle {
        let session_id = session_id.into();
        let message = message.into();
        let orchestrator = self.clone();
        let task_session_id = session_id.clone();
        let handle =
            tokio::spawn(async move { orchestrator.send(&task_session_id, &message).await });
        SendHandle { session_id, handle }
    }

    /// Send a one-off message straight to the provider without touching memory.
    pub async fn probe(&self, message: &str) -> Result<String, CoreError> {
        self.validate_message(message)?;
        let request = self.build_request(&[], &Turn::user(message));
        debug!("probing provider (message_len={})", message.len());
        self.provider.generate(&request).await.map_err(|err| {
            warn!("provider probe failed (error={})", err);
            CoreError::from(err)
        })
    }

    /// Remove one session. `false` when no live session existed.
    pub fn clear(&self, session_id: &str) -> bool {
        self.store.clear(session_id)
    }

    /// Remove every session, returning how many live sessions were dropped.
    pub fn clear_all(&self) -> usize {
        self.store.clear_all()
    }

    pub fn stats(&self) -> MemoryStats {
        self.store.stats()
    }

    /// Snapshot of a session's transcript, creating it when absent.
    pub fn transcript(&self, session_id: &str) -> Result<Transcript, CoreError> {
        Ok(self.store.get_or_create(session_id)?)
    }

    pub fn provider_info(&self) -> ProviderInfo {
        self.provider.info()
    }

    pub async fn provider_healthy(&self) -> bool {
        self.provider.health_check().await
    }

    fn validate(&self, session_id: &str, message: &str) -> Result<(), CoreError> {
        if session_id.is_empty() {
            return Err(CoreError::InvalidInput(
                "session_id must not be empty".to_string(),
            ));
        }
        self.validate_message(message)
    }

    fn validate_message(&self, message: &str) -> Result<(), CoreError> {
        if message.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "message must not be empty".to_string(),
            ));
        }
        let chars = message.chars().count();
        if chars > self.options.max_message_chars {
            return Err(CoreError::InvalidInput(format!(
                "message exceeds {} characters (got {})",
                self.options.max_message_chars, chars
            )));
        }
        Ok(())
    }

    fn build_request(&self, history: &[Turn], user_turn: &Turn) -> Vec<Turn> {
        let mut request = Vec::with_capacity(history.len() + 2);
        if let Some(prompt) = &self.options.system_prompt {
            request.push(Turn::system(prompt.clone()));
        }
        request.extend_from_slice(history);
        request.push(user_turn.clone());
        request
    }
}
