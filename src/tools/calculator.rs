//! Calculator tool: the model translates a math question into a single
//! expression, which is then evaluated locally.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;

use super::expr::{evaluate, format_number};
use super::{Tool, ToolError};
use crate::llm::{ChatMessage, LlmClient};

const MATH_PROMPT: &str = r#"Translate a math problem into a single-line arithmetic expression that a calculator can evaluate. The calculator understands + - * / % ** and parentheses, the constants pi and e, and the functions sqrt, abs, ln, log10, exp, sin, cos, tan, floor, ceil and round. Use the result of the calculation to answer the question.

Question: ${Question with math problem.}
```text
${single line mathematical expression that solves the problem}
```
```output
${Output of evaluating the expression}
```
Answer: ${Answer}

Begin.

Question: What is 37593 * 67?
```text
37593 * 67
```
```output
2518731
```
Answer: 2518731

Question: 37593^(1/5)
```text
37593**(1/5)
```
```output
8.222831614237718
```
Answer: 8.222831614237718

Question: {question}
"#;

const OUTPUT_FENCE: &str = "```output";

static TEXT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^```text\s*(.*?)```").unwrap());

/// Arithmetic evaluation chain backed by the language model.
pub struct MathChain {
    llm: Arc<dyn LlmClient>,
}

impl MathChain {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Answer a math question, returning `Answer: <value>`.
    pub async fn run(&self, question: &str) -> Result<String, ToolError> {
        let prompt = MATH_PROMPT.replace("{question}", question);
        let reply = self
            .llm
            .complete(&[ChatMessage::user(prompt)], &[OUTPUT_FENCE.to_string()])
            .await?;
        process_reply(&reply)
    }
}

fn process_reply(reply: &str) -> Result<String, ToolError> {
    let reply = reply.trim();

    if let Some(caps) = TEXT_BLOCK.captures(reply) {
        let expression = caps[1].trim();
        let value = evaluate(expression).map_err(|e| {
            ToolError::Input(format!("could not evaluate \"{}\": {}", expression, e))
        })?;
        tracing::debug!(%expression, value, "Evaluated expression");
        return Ok(format!("Answer: {}", format_number(value)));
    }

    if reply.starts_with("Answer:") {
        return Ok(reply.to_string());
    }
    if let Some(idx) = reply.rfind("Answer:") {
        return Ok(format!("Answer: {}", reply[idx + "Answer:".len()..].trim()));
    }

    Err(ToolError::Input(format!("unknown format from LLM: {}", reply)))
}

/// The `Calculator` tool.
pub struct Calculator {
    chain: MathChain,
}

impl Calculator {
    pub fn new(chain: MathChain) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl Tool for Calculator {
    fn name(&self) -> &str {
        "Calculator"
    }

    fn description(&self) -> &str {
        "A tool for answering math related questions. Only input mathematical expression need to be provided"
    }

    async fn run(&self, input: &str) -> Result<String, ToolError> {
        self.chain.run(input).await
    }
}
