//! Language model access.
//!
//! Everything that talks to the hosted model goes through [`LlmClient`]: the
//! agent loop, the reasoning tool and the arithmetic chain all share one
//! client built from the session credential.

mod groq;

pub use groq::GroqClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message author role, in OpenAI wire spelling.
///
/// Every prompt is sent as a single user message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// A single chat message sent to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("model API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("request to model API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected model API response: {0}")]
    Decode(String),
}

/// Text completion capability of the hosted model.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Run one chat completion and return the assistant text.
    ///
    /// Generation halts before any of the `stop` sequences.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        stop: &[String],
    ) -> Result<String, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_wire_shape() {
        let value = serde_json::to_value(ChatMessage::user("2+2?")).unwrap();
        assert_eq!(value, serde_json::json!({"role": "user", "content": "2+2?"}));
    }
}
