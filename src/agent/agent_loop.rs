//! Core agent loop implementation.

use std::sync::Arc;

use async_trait::async_trait;

use super::events::{AgentEvent, StepSink};
use super::parser::{parse_output, AgentOutput};
use super::prompt::{build_react_prompt, render_history, OBSERVATION_STOP};
use super::{AgentError, Solver};
use crate::chat::ChatTurn;
use crate::llm::{ChatMessage, LlmClient};
use crate::tools::ToolRegistry;

/// Returned when the loop runs out of iterations without a final answer.
pub const ITERATION_LIMIT_ANSWER: &str = "Agent stopped due to iteration limit or time limit.";

/// Zero-shot ReAct agent.
pub struct Agent {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    max_iterations: usize,
}

impl Agent {
    pub fn new(llm: Arc<dyn LlmClient>, tools: ToolRegistry, max_iterations: usize) -> Self {
        Self {
            llm,
            tools,
            max_iterations,
        }
    }

    /// Execute a single tool call and return the observation text.
    async fn execute_tool_call(&self, tool: &str, input: &str) -> Result<String, AgentError> {
        let Some(handler) = self.tools.get(tool) else {
            return Ok(format!(
                "{} is not a valid tool, try one of [{}].",
                tool,
                self.tools.names().join(", ")
            ));
        };

        match handler.run(input).await {
            Ok(output) => Ok(output),
            Err(e) if e.is_upstream() => Err(AgentError::Tool {
                tool: tool.to_string(),
                source: e,
            }),
            Err(e) => Ok(format!("Error: {}", e)),
        }
    }
}

#[async_trait]
impl Solver for Agent {
    async fn solve(&self, history: &[ChatTurn], sink: &StepSink) -> Result<String, AgentError> {
        let question = render_history(history);
        let tool_info = self.tools.list_tools();
        let stop = vec![OBSERVATION_STOP.to_string()];
        let mut scratchpad = String::new();

        for iteration in 0..self.max_iterations {
            tracing::debug!(iteration = iteration + 1, model = %self.llm.model(), "Agent iteration");

            let prompt = build_react_prompt(&tool_info, &question, &scratchpad);
            let output = self
                .llm
                .complete(&[ChatMessage::user(prompt)], &stop)
                .await?;

            let observation = match parse_output(&output) {
                Ok(AgentOutput::Finish { thought, answer }) => {
                    if !thought.is_empty() {
                        sink.emit(AgentEvent::Thought { content: thought });
                    }
                    sink.emit(AgentEvent::Answer {
                        content: answer.clone(),
                    });
                    return Ok(answer);
                }
                Ok(AgentOutput::Action {
                    thought,
                    tool,
                    input,
                }) => {
                    if !thought.is_empty() {
                        sink.emit(AgentEvent::Thought { content: thought });
                    }
                    sink.emit(AgentEvent::ToolCall {
                        tool: tool.clone(),
                        input: input.clone(),
                    });
                    tracing::info!(%tool, "Calling tool");

                    let result = self.execute_tool_call(&tool, &input).await?;
                    sink.emit(AgentEvent::ToolResult {
                        tool,
                        output: result.clone(),
                    });
                    result
                }
                Err(e) => {
                    tracing::warn!(iteration = iteration + 1, error = %e, "Unparseable agent output; continuing");
                    let message = e.to_string();
                    sink.emit(AgentEvent::ParseError {
                        message: message.clone(),
                    });
                    message
                }
            };

            scratchpad.push_str(&output);
            scratchpad.push_str("\nObservation: ");
            scratchpad.push_str(&observation);
            scratchpad.push_str("\nThought: ");
        }

        tracing::warn!(max_iterations = self.max_iterations, "Agent hit iteration limit");
        let answer = ITERATION_LIMIT_ANSWER.to_string();
        sink.emit(AgentEvent::Answer {
            content: answer.clone(),
        });
        Ok(answer)
    }
}
