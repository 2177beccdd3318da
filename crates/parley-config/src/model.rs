//! Configuration schema for Parley.

use serde::{Deserialize, Serialize};

/// Root config for the Parley service.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ParleyConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl ParleyConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> ParleyConfigBuilder {
        ParleyConfigBuilder::new()
    }
}

/// Builder for assembling a `ParleyConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct ParleyConfigBuilder {
    config: ParleyConfig,
}

impl ParleyConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ParleyConfig::default(),
        }
    }

    /// Replace the session memory configuration.
    pub fn memory(mut self, memory: MemoryConfig) -> Self {
        self.config.memory = memory;
        self
    }

    /// Replace the chat configuration.
    pub fn chat(mut self, chat: ChatConfig) -> Self {
        self.config.chat = chat;
        self
    }

    /// Replace the LLM provider configuration.
    pub fn provider(mut self, provider: ProviderConfig) -> Self {
        self.config.provider = provider;
        self
    }

    /// Replace the HTTP server configuration.
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.config.server = server;
        self
    }

    pub fn build(self) -> ParleyConfig {
        self.config
    }
}

/// Session memory limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryConfig {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
    /// Period of the background expiry sweep; disabled when unset.
    #[serde(default)]
    pub sweep_interval_seconds: Option<u64>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            ttl_seconds: default_ttl_seconds(),
            sweep_interval_seconds: None,
        }
    }
}

fn default_max_entries() -> usize {
    1000
}

fn default_ttl_seconds() -> u64 {
    3600
}

/// Chat turn handling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatConfig {
    /// Maximum user message length in characters.
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
    /// Instruction sent ahead of every transcript; never stored.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_chars: default_max_message_chars(),
            system_prompt: None,
        }
    }
}

fn default_max_message_chars() -> usize {
    4000
}

/// OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderConfig {
    /// Display name reported by status endpoints.
    #[serde(default = "default_provider_name")]
    pub name: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_provider_name() -> String {
    "chatgroq".to_string()
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_model() -> String {
    "llama3-8b-8192".to_string()
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_timeout_seconds() -> u64 {
    30
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}
