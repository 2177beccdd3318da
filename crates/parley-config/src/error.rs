//! Errors raised while loading, overriding, or validating config.

use thiserror::Error;

/// Errors returned while loading or validating config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading a config layer from disk failed.
    #[error("failed to read config: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// A layer was not valid JSON5.
    #[error("failed to parse config: {0}")]
    ParseFailed(#[from] json5::Error),
    /// The merged tree did not decode into `ParleyConfig`.
    #[error("failed to decode config: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    /// A specific field failed schema validation.
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
    /// An environment override could not be parsed.
    #[error("invalid value for {var}: {message}")]
    InvalidEnv { var: String, message: String },
    /// A cross-field invariant failed.
    #[error("invalid config: {0}")]
    Invalid(String),
}
