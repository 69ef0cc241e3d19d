//! Reasoning tool: a fixed step-by-step prompt sent to the model.

use std::sync::Arc;

use async_trait::async_trait;

use super::{Tool, ToolError};
use crate::llm::{ChatMessage, LlmClient};

/// Build the reasoning prompt for a question.
pub fn build_reasoning_prompt(question: &str) -> String {
    format!(
        r#"
You're an agent tasked with solving users' mathematical questions. Logically arrive at the solution and provide a detailed explanation
and display it pointwise for the question below.
Question: {question}
Answer:
"#,
        question = question
    )
}

/// The `Reasoning tool`.
pub struct ReasoningTool {
    llm: Arc<dyn LlmClient>,
}

impl ReasoningTool {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Tool for ReasoningTool {
    fn name(&self) -> &str {
        "Reasoning tool"
    }

    fn description(&self) -> &str {
        "A tool for answering logic-based and reasoning questions."
    }

    async fn run(&self, input: &str) -> Result<String, ToolError> {
        let prompt = build_reasoning_prompt(input);
        let answer = self.llm.complete(&[ChatMessage::user(prompt)], &[]).await?;
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;

    struct EchoLlm;

    #[async_trait]
    impl LlmClient for EchoLlm {
        fn model(&self) -> &str {
            "echo"
        }

        async fn complete(&self, messages: &[ChatMessage], _: &[String]) -> Result<String, LlmError> {
            Ok(messages[0].content.clone())
        }
    }

    struct DownLlm;

    #[async_trait]
    impl LlmClient for DownLlm {
        fn model(&self) -> &str {
            "down"
        }

        async fn complete(&self, _: &[ChatMessage], _: &[String]) -> Result<String, LlmError> {
            Err(LlmError::Api {
                status: 503,
                message: "over capacity".into(),
            })
        }
    }

    #[test]
    fn test_prompt_embeds_question() {
        let prompt = build_reasoning_prompt("Is 7 prime?");
        assert!(prompt.contains("display it pointwise"));
        assert!(prompt.contains("Question: Is 7 prime?\nAnswer:"));
    }

    #[tokio::test]
    async fn test_run_forwards_templated_prompt() {
        let tool = ReasoningTool::new(Arc::new(EchoLlm));
        let out = tool.run("Why is the sky blue?").await.unwrap();
        assert!(out.contains("Question: Why is the sky blue?"));
    }

    #[tokio::test]
    async fn test_model_failure_is_upstream() {
        let tool = ReasoningTool::new(Arc::new(DownLlm));
        let err = tool.run("anything").await.unwrap_err();
        assert!(err.is_upstream());
    }
}
