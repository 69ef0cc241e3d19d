//! Tools the agent can call.
//!
//! Every tool is a string-in, string-out adapter around one external service:
//! - `Wikipedia`: encyclopedia lookup through the MediaWiki API
//! - `Calculator`: arithmetic chain backed by the language model
//! - `Reasoning tool`: templated step-by-step prompt to the language model
//!
//! Tools are stateless and rebuilt with each agent, so they carry nothing
//! between calls.

mod calculator;
mod expr;
mod reasoning;
mod wikipedia;

pub use calculator::{Calculator, MathChain};
pub use expr::{evaluate, format_number, EvalError};
pub use reasoning::ReasoningTool;
pub use wikipedia::{WikipediaClient, WikipediaTool};

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::llm::{LlmClient, LlmError};

/// Failure of a single tool call.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The language model behind the tool failed.
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// The encyclopedia service could not be reached or answered garbage.
    #[error("encyclopedia search failed: {0}")]
    Search(#[from] reqwest::Error),

    /// The tool ran but could not make sense of its input.
    #[error("{0}")]
    Input(String),
}

impl ToolError {
    /// Upstream failures end the turn; input errors go back to the agent.
    pub fn is_upstream(&self) -> bool {
        !matches!(self, ToolError::Input(_))
    }
}

/// A named, described callable.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the agent uses in `Action:` lines.
    fn name(&self) -> &str;

    /// One-line description shown to the agent.
    fn description(&self) -> &str;

    /// Run the tool on a raw query string.
    async fn run(&self, input: &str) -> Result<String, ToolError>;
}

/// Tool descriptor for prompt rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

/// Ordered set of tools available to the agent.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Build a registry from arbitrary tools, in prompt order.
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// Assemble the standard toolkit: lookup, calculator, reasoner.
    pub fn assemble(
        llm: Arc<dyn LlmClient>,
        http: reqwest::Client,
        wikipedia_api_url: &str,
    ) -> Self {
        let wikipedia = WikipediaClient::new(http, wikipedia_api_url);
        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(WikipediaTool::new(wikipedia)),
            Arc::new(Calculator::new(MathChain::new(llm.clone()))),
            Arc::new(ReasoningTool::new(llm)),
        ];
        Self::new(tools)
    }

    /// List tool descriptors in registration order.
    pub fn list_tools(&self) -> Vec<ToolInfo> {
        self.tools
            .iter()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect()
    }

    /// Tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Look a tool up by exact name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }
}
