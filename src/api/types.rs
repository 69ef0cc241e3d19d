//! API request and response types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::{ChatTurn, Phase};

/// Sidebar credential form.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialForm {
    #[serde(default)]
    pub api_key: String,
}

/// Question form posted by the page.
#[derive(Debug, Clone, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub question: String,
}

/// JSON body for the streaming ask endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
}

/// Session transcript snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    /// Session identifier
    pub id: Uuid,

    /// Whether an API key has been entered
    pub has_credential: bool,

    /// Current position in the submit cycle
    pub phase: Phase,

    /// Turns in display order
    pub turns: Vec<ChatTurn>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Model the agent runs on
    pub model: String,
}
