//! Provider trait for chat completion integrations

use async_trait::async_trait;

use crate::error::Result;
use crate::message::Message;

/// Request for a chat completion
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    /// Model name to use (provider default when `None`)
    pub model: Option<String>,
    /// Ordered conversation, system prompt first
    pub messages: Vec<Message>,
    /// Optional temperature setting
    pub temperature: Option<f64>,
    /// Optional max tokens
    pub max_tokens: Option<u64>,
}

impl ChatRequest {
    /// Create a request from messages with provider defaults
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    /// Override the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Trait for chat completion providers
///
/// Implement this trait to add support for a new LLM provider.
/// Implementations must reject requests that fail
/// [`validate_messages`](crate::message::validate_messages).
#[async_trait]
pub trait Provider: Send + Sync {
    /// Run a completion request and return the reply text
    async fn complete(&self, request: ChatRequest) -> Result<String>;

    /// Get provider name (for logging/debugging)
    fn name(&self) -> &'static str;
}
