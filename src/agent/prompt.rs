//! Prompt templates for the zero-shot ReAct agent.

use crate::chat::ChatTurn;
use crate::tools::ToolInfo;

/// Sequence the model is told to stop at, so the agent can fill in the observation.
pub const OBSERVATION_STOP: &str = "\nObservation:";

/// Render the conversation as the agent's question, oldest turn first.
pub fn render_history(history: &[ChatTurn]) -> String {
    history
        .iter()
        .map(|turn| format!("{}: {}", turn.role.as_str(), turn.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the full ReAct prompt with tool descriptions and the scratchpad so far.
pub fn build_react_prompt(tools: &[ToolInfo], question: &str, scratchpad: &str) -> String {
    let tool_descriptions = tools
        .iter()
        .map(|t| format!("{}: {}", t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n");

    let tool_names = tools
        .iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"Answer the following questions as best you can. You have access to the following tools:

{tool_descriptions}

Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question

Begin!

Question: {question}
Thought:{scratchpad}"#,
        tool_descriptions = tool_descriptions,
        tool_names = tool_names,
        question = question,
        scratchpad = scratchpad
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatRole, ChatTurn};

    fn tools() -> Vec<ToolInfo> {
        vec![
            ToolInfo {
                name: "Calculator".into(),
                description: "does math".into(),
            },
            ToolInfo {
                name: "Reasoning tool".into(),
                description: "thinks".into(),
            },
        ]
    }

    #[test]
    fn test_history_keeps_every_turn_in_order() {
        let history = vec![
            ChatTurn::new(ChatRole::Assistant, "Hi"),
            ChatTurn::new(ChatRole::User, "What is 2+2?"),
            ChatTurn::new(ChatRole::Assistant, "4"),
            ChatTurn::new(ChatRole::User, "And times 3?"),
        ];
        assert_eq!(
            render_history(&history),
            "assistant: Hi\nuser: What is 2+2?\nassistant: 4\nuser: And times 3?"
        );
    }

    #[test]
    fn test_prompt_lists_tools_and_ends_with_scratchpad() {
        let prompt = build_react_prompt(&tools(), "user: 2+2", " I should add.");
        assert!(prompt.contains("Calculator: does math\nReasoning tool: thinks"));
        assert!(prompt.contains("should be one of [Calculator, Reasoning tool]"));
        assert!(prompt.ends_with("Question: user: 2+2\nThought: I should add."));
    }
}
