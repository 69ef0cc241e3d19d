//! Parser for ReAct-formatted model output.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

const FINAL_ANSWER: &str = "Final Answer:";

static ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:\s*(.*?)\s*Action\s*\d*\s*Input\s*\d*\s*:\s*(.*)").unwrap()
});
static ACTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Action\s*\d*\s*:\s*(.*?)").unwrap());
static ACTION_INPUT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\s*Action\s*\d*\s*Input\s*\d*\s*:\s*(.*)").unwrap()
});

/// One decoded model step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentOutput {
    /// Call `tool` with `input`.
    Action {
        thought: String,
        tool: String,
        input: String,
    },
    /// Stop and answer.
    Finish { thought: String, answer: String },
}

/// Output the agent could not decode. The message is fed back to the model.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid Format: Missing 'Action:' after 'Thought:'")]
    MissingAction,

    #[error("Invalid Format: Missing 'Action Input:' after 'Action:'")]
    MissingActionInput,

    #[error("Invalid Format: output contained both a final answer and an action; give only one")]
    AnswerAndAction,

    #[error("Invalid Format: could not parse LLM output")]
    Unparseable,
}

fn thought_before(text: &str, marker: usize) -> String {
    text[..marker].trim().to_string()
}

/// Decode one model completion.
pub fn parse_output(text: &str) -> Result<AgentOutput, ParseError> {
    let answer_at = text.find(FINAL_ANSWER);

    if let Some(caps) = ACTION.captures(text) {
        if answer_at.is_some() {
            return Err(ParseError::AnswerAndAction);
        }
        let whole = caps.get(0).map(|m| m.start()).unwrap_or(0);
        let tool = caps[1].trim().to_string();
        let input = caps[2].trim().trim_matches('"').to_string();
        return Ok(AgentOutput::Action {
            thought: thought_before(text, whole),
            tool,
            input,
        });
    }

    if let Some(idx) = answer_at {
        let answer = text
            .rsplit(FINAL_ANSWER)
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        return Ok(AgentOutput::Finish {
            thought: thought_before(text, idx),
            answer,
        });
    }

    if !ACTION_LINE.is_match(text) {
        Err(ParseError::MissingAction)
    } else if !ACTION_INPUT_LINE.is_match(text) {
        Err(ParseError::MissingActionInput)
    } else {
        Err(ParseError::Unparseable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_action() {
        let out = parse_output(
            " I need to compute the sum.\nAction: Calculator\nAction Input: \"7 + 8\"",
        )
        .unwrap();
        assert_eq!(
            out,
            AgentOutput::Action {
                thought: "I need to compute the sum.".into(),
                tool: "Calculator".into(),
                input: "7 + 8".into(),
            }
        );
    }

    #[test]
    fn test_parses_multiword_tool_and_multiline_input() {
        let out = parse_output("Action: Reasoning tool\nAction Input: A gets 7 more.\nB gets 8 more.")
            .unwrap();
        match out {
            AgentOutput::Action { tool, input, .. } => {
                assert_eq!(tool, "Reasoning tool");
                assert_eq!(input, "A gets 7 more.\nB gets 8 more.");
            }
            other => panic!("expected action, got {other:?}"),
        }
    }

    #[test]
    fn test_parses_final_answer() {
        let out = parse_output(" I now know the final answer\nFinal Answer: The ratio is 25:18:10")
            .unwrap();
        assert_eq!(
            out,
            AgentOutput::Finish {
                thought: "I now know the final answer".into(),
                answer: "The ratio is 25:18:10".into(),
            }
        );
    }

    #[test]
    fn test_answer_and_action_is_rejected() {
        let err = parse_output("Action: Calculator\nAction Input: 2+2\nFinal Answer: 4").unwrap_err();
        assert_eq!(err, ParseError::AnswerAndAction);
    }

    #[test]
    fn test_missing_pieces() {
        assert_eq!(
            parse_output("I think the answer is four.").unwrap_err(),
            ParseError::MissingAction
        );
        assert_eq!(
            parse_output("Action: Calculator").unwrap_err(),
            ParseError::MissingActionInput
        );
    }

    #[test]
    fn test_error_text_starts_with_invalid_format() {
        assert!(ParseError::Unparseable.to_string().starts_with("Invalid Format:"));
    }
}
