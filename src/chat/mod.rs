//! Chat sessions: turns, credentials and the submit state machine.

mod store;
mod turn;

pub use store::{SessionStore, SharedSession};
pub use turn::{submit, GroqSolverFactory, SolverFactory, SubmitOutcome};

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// First assistant turn of every new session.
pub const GREETING: &str = "Hi, I'm a Math chatbot who can answer all your maths questions";

/// Question the input box is pre-filled with.
pub const DEFAULT_QUESTION: &str = "A sum of Rs 53 is divided among A, B, and C in such a way that A gets Rs. 7 more than what B gets, and B gets Rs. 8 more than what C gets. What is the ratio of their shares?";

pub const MISSING_CREDENTIAL_MESSAGE: &str = "Please add your Groq API key to continue";
pub const EMPTY_QUESTION_MESSAGE: &str = "Please enter the question";

/// Speaker of a chat turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatTurn {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Groq API key for one session. Never logged or persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Accept a raw input value; blank input is no credential.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Where a session is in the submit cycle.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitingInput,
    Processing,
    DisplayingResult,
}

/// Per-browser conversation state.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    credential: Option<Credential>,
    turns: Vec<ChatTurn>,
    phase: Phase,
    last_active: DateTime<Utc>,
}

impl Session {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            credential: None,
            turns: vec![ChatTurn::new(ChatRole::Assistant, GREETING)],
            phase: Phase::AwaitingInput,
            last_active: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Store the key typed into the sidebar; blank input clears it.
    pub fn set_credential(&mut self, raw: &str) {
        self.credential = Credential::parse(raw);
        self.touch();
    }

    /// Turns in insertion order.
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }

    pub(crate) fn push_turn(&mut self, role: ChatRole, content: impl Into<String>) {
        self.turns.push(ChatTurn::new(role, content));
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn touch(&mut self) {
        self.last_active = Utc::now();
    }
}
