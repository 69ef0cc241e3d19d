use serde::Serialize;
use tokio::sync::mpsc;

/// Intermediate and final agent events, streamed to the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// Agent is thinking/reasoning.
    Thought { content: String },
    /// Agent is calling a tool.
    ToolCall { tool: String, input: String },
    /// Tool execution completed.
    ToolResult { tool: String, output: String },
    /// Model output did not parse; the message went back to the model.
    ParseError { message: String },
    /// Final answer for the turn.
    Answer { content: String },
    /// Turn ended with an upstream failure.
    Error { message: String },
}

impl AgentEvent {
    /// SSE event name.
    pub fn event_name(&self) -> &'static str {
        match self {
            AgentEvent::Thought { .. } => "thought",
            AgentEvent::ToolCall { .. } => "tool_call",
            AgentEvent::ToolResult { .. } => "tool_result",
            AgentEvent::ParseError { .. } => "parse_error",
            AgentEvent::Answer { .. } => "answer",
            AgentEvent::Error { .. } => "error",
        }
    }
}

/// Where the agent reports its steps. Sends never fail the turn.
#[derive(Debug, Clone, Default)]
pub struct StepSink {
    tx: Option<mpsc::UnboundedSender<AgentEvent>>,
}

impl StepSink {
    pub fn new(tx: mpsc::UnboundedSender<AgentEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A sink that drops everything.
    pub fn discard() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: AgentEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).is_err() {
                tracing::trace!("Step receiver dropped; event discarded");
            }
        }
    }
}
