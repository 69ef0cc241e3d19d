//! Agent module - answers a conversation using tools.
//!
//! The agent follows the zero-shot ReAct pattern:
//! 1. Render the conversation and tool descriptions into one prompt
//! 2. Ask the model for a `Thought` and either an `Action` or a `Final Answer`
//! 3. Run the chosen tool and append its `Observation` to the scratchpad
//! 4. Repeat until a final answer or the iteration cap
//!
//! Callers only see [`Solver`]; everything else is an implementation detail.

mod agent_loop;
mod events;
mod parser;
mod prompt;

pub use agent_loop::{Agent, ITERATION_LIMIT_ANSWER};
pub use events::{AgentEvent, StepSink};
pub use parser::{parse_output, AgentOutput, ParseError};
pub use prompt::{build_react_prompt, render_history};

use async_trait::async_trait;
use thiserror::Error;

use crate::chat::ChatTurn;
use crate::llm::LlmError;
use crate::tools::ToolError;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("tool '{tool}' failed: {source}")]
    Tool {
        tool: String,
        #[source]
        source: ToolError,
    },
}

/// Turns a conversation into one answer.
#[async_trait]
pub trait Solver: Send + Sync {
    /// Solve the latest user turn given the full history.
    ///
    /// Intermediate steps go to `sink` while the call is in flight.
    async fn solve(&self, history: &[ChatTurn], sink: &StepSink) -> Result<String, AgentError>;
}
