//! Client for OpenAI-compatible `/chat/completions` endpoints (Groq, OpenAI, vLLM, ...).

use super::{ChatProvider, ProviderError};
use async_trait::async_trait;
use log::{debug, warn};
use parley_config::ProviderConfig;
use parley_memory::Turn;
use parley_protocol::ProviderInfo;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound on a `/models` liveness request.
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Chat provider speaking the OpenAI chat completions wire format.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    client: Client,
    name: String,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
    health_timeout: Duration,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatibleProvider {
    /// Build a provider from config and an already-resolved API key.
    pub fn from_config(
        config: &ProviderConfig,
        api_key: Option<String>,
    ) -> Result<Self, ProviderError> {
        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                ProviderError::Config(format!("missing API key (set {})", config.api_key_env))
            })?;
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ProviderError::Config("base_url must not be empty".to_string()));
        }
        let client = Client::builder()
            .build()
            .map_err(|err| ProviderError::Config(err.to_string()))?;
        Ok(Self {
            client,
            name: config.name.clone(),
            base_url,
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.timeout_seconds),
            health_timeout: HEALTH_CHECK_TIMEOUT,
        })
    }

    /// Build a provider reading the API key from `config.api_key_env`.
    pub fn from_env(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Self::from_config(config, std::env::var(&config.api_key_env).ok())
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the liveness timeout; it never exceeds the request timeout.
    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    fn endpoint(&self, suffix: &str) -> String {
        format!("{}/{}", self.base_url, suffix)
    }
}

fn map_send_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Transport(err.to_string())
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatibleProvider {
    async fn generate(&self, messages: &[Turn]) -> Result<String, ProviderError> {
        let request = CompletionRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|turn| WireMessage {
                    role: turn.role().as_str(),
                    content: turn.content(),
                })
                .collect(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        debug!(
            "sending chat completion (model={}, messages={})",
            self.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                "chat completion rejected (model={}, status={})",
                self.model,
                status.as_u16()
            );
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = response.json().await.map_err(|err| {
            if err.is_timeout() {
                ProviderError::Timeout
            } else {
                ProviderError::InvalidResponse(err.to_string())
            }
        })?;
        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                ProviderError::InvalidResponse("response contained no message content".to_string())
            })?;
        debug!(
            "chat completion received (model={}, reply_len={})",
            self.model,
            reply.len()
        );
        Ok(reply)
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            provider: self.name.clone(),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            description: format!("OpenAI-compatible chat completions at {}", self.base_url),
        }
    }

    async fn health_check(&self) -> bool {
        let result = self
            .client
            .get(self.endpoint("models"))
            .bearer_auth(&self.api_key)
            .timeout(self.health_timeout.min(self.timeout))
            .send()
            .await;
        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(
                    "provider health check failed (status={})",
                    response.status().as_u16()
                );
                false
            }
            Err(err) => {
                warn!("provider health check failed (error={})", err);
                false
            }
        }
    }
}
