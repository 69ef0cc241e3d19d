//! # CrackMaths
//!
//! A text-to-maths problem solver behind a single chat page.
//!
//! This library provides:
//! - A server-rendered chat page with per-browser sessions
//! - A zero-shot ReAct agent over three tools (Wikipedia, Calculator, Reasoning tool)
//! - A Groq (OpenAI-compatible) model client
//!
//! ## Architecture
//!
//! Each question goes through the same cycle:
//! 1. Check the session has a Groq API key
//! 2. Append the user turn to the session transcript
//! 3. Build the model client, tools and agent for this interaction
//! 4. Let the agent pick tools until it has a final answer
//! 5. Append the assistant turn and render it
//!
//! ## Example
//!
//! ```rust,ignore
//! use crackmaths::{api, config::Config};
//!
//! let config = Config::from_env()?;
//! api::serve(config).await?;
//! ```

pub mod agent;
pub mod api;
pub mod chat;
pub mod config;
pub mod llm;
pub mod tools;

pub use config::Config;
