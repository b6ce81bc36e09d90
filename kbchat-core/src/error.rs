//! Error types for kbchat

use thiserror::Error;

/// Result type alias using kbchat's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for kbchat
#[derive(Debug, Error)]
pub enum Error {
    // ============ Provider Errors ============
    /// Provider API error
    #[error("Provider API error: {0}")]
    ProviderApi(String),

    /// Provider authentication failed (missing or rejected credential)
    #[error("Provider authentication error: {0}")]
    ProviderAuth(String),

    /// Provider rate limit exceeded
    #[error("Provider rate limit exceeded: retry after {retry_after_secs}s")]
    ProviderRateLimit {
        /// Seconds to wait before retrying
        retry_after_secs: u64,
    },

    // ============ Message Errors ============
    /// A chat message or message list failed validation
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Message serialization failed
    #[error("Message serialization error: {0}")]
    MessageSerialize(#[from] serde_json::Error),

    // ============ Retrieval Errors ============
    /// Document rejected by the store
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Embedding could not be computed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Static corpus could not be loaded
    #[error("Corpus error: {0}")]
    Corpus(String),

    // ============ Configuration Errors ============
    /// Configuration value out of range
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] serde_yaml_ng::Error),

    // ============ Network Errors ============
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // ============ System Errors ============
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============ Generic Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a new invalid message error
    pub fn invalid_message(msg: impl Into<String>) -> Self {
        Self::InvalidMessage(msg.into())
    }

    /// Create a new invalid document error
    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    /// Create a new embedding error
    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if this error comes from an unavailable provider
    /// (missing credentials, upstream HTTP failure, rate limiting)
    pub fn is_provider_unavailable(&self) -> bool {
        matches!(
            self,
            Self::ProviderApi(_)
                | Self::ProviderAuth(_)
                | Self::ProviderRateLimit { .. }
                | Self::Http(_)
        )
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderRateLimit { .. } | Self::Http(_))
    }
}
