//! The submit state machine: gate, validate, append, solve, append.

use std::sync::Arc;

use super::{ChatRole, Credential, Phase, Session};
use crate::agent::{Agent, AgentEvent, Solver, StepSink};
use crate::config::Config;
use crate::llm::GroqClient;
use crate::tools::ToolRegistry;

/// Builds a fresh solver for one interaction.
pub trait SolverFactory: Send + Sync {
    fn build(&self, credential: &Credential) -> Arc<dyn Solver>;
}

/// Production factory: Groq model, the three standard tools, ReAct agent.
pub struct GroqSolverFactory {
    http: reqwest::Client,
    config: Config,
}

impl GroqSolverFactory {
    pub fn new(http: reqwest::Client, config: Config) -> Self {
        Self { http, config }
    }
}

impl SolverFactory for GroqSolverFactory {
    fn build(&self, credential: &Credential) -> Arc<dyn Solver> {
        let llm = Arc::new(GroqClient::new(
            self.http.clone(),
            credential.expose().to_string(),
            &self.config.model,
        ));
        let tools = ToolRegistry::assemble(
            llm.clone(),
            self.http.clone(),
            &self.config.wikipedia_api_url,
        );
        Arc::new(Agent::new(llm, tools, self.config.max_iterations))
    }
}

/// Result of one submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No key in the session; nothing was built or called.
    CredentialMissing,
    /// Blank question; nothing was appended.
    EmptyQuestion,
    /// Both turns were appended.
    Answered { answer: String },
    /// The user turn was appended but the agent failed upstream.
    Failed { message: String },
}

/// Run one submit against a session.
pub async fn submit(
    session: &mut Session,
    question: &str,
    factory: &dyn SolverFactory,
    sink: &StepSink,
) -> SubmitOutcome {
    session.touch();

    let Some(credential) = session.credential().cloned() else {
        return SubmitOutcome::CredentialMissing;
    };

    if question.trim().is_empty() {
        session.set_phase(Phase::AwaitingInput);
        return SubmitOutcome::EmptyQuestion;
    }

    session.push_turn(ChatRole::User, question);
    session.set_phase(Phase::Processing);

    let solver = factory.build(&credential);
    let result = solver.solve(session.turns(), sink).await;
    session.touch();

    match result {
        Ok(answer) => {
            session.push_turn(ChatRole::Assistant, answer.clone());
            session.set_phase(Phase::DisplayingResult);
            SubmitOutcome::Answered { answer }
        }
        Err(e) => {
            tracing::error!(session_id = %session.id(), error = %e, "Agent turn failed");
            let message = e.to_string();
            sink.emit(AgentEvent::Error {
                message: message.clone(),
            });
            session.set_phase(Phase::AwaitingInput);
            SubmitOutcome::Failed { message }
        }
    }
}
