//! Message types for LLM communication

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Role of the message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System message (instructions)
    System,
    /// User message
    User,
    /// Assistant (AI) message
    Assistant,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the sender
    pub role: Role,
    /// Text content of the message
    pub content: String,
}

impl Message {
    /// Create a new message
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Copy of this message with surrounding whitespace removed from the content
    pub fn trimmed(&self) -> Self {
        Self::new(self.role, self.content.trim())
    }
}

/// Validate a message list before it is sent to a chat provider.
///
/// Rejects an empty list and any message whose content is empty or
/// whitespace only.
pub fn validate_messages(messages: &[Message]) -> Result<()> {
    if messages.is_empty() {
        return Err(Error::invalid_message("message list must not be empty"));
    }

    for msg in messages {
        if msg.content.trim().is_empty() {
            return Err(Error::invalid_message(format!(
                "content of '{}' message must not be empty",
                msg.role.as_str()
            )));
        }
    }

    Ok(())
}
