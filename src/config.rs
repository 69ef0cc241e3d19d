//! Configuration management for CrackMaths.
//!
//! Configuration can be set via environment variables:
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `8501`.
//! - `GROQ_BASE_URL` - Optional. OpenAI-compatible Groq endpoint. Defaults to `https://api.groq.com/openai/v1`.
//! - `DEFAULT_MODEL` - Optional. The model identifier. Defaults to `gemma2-9b-it`.
//! - `MODEL_TEMPERATURE` - Optional. Sampling temperature. Defaults to `0.7`.
//! - `WIKIPEDIA_API_URL` - Optional. MediaWiki `api.php` endpoint. Defaults to English Wikipedia.
//! - `MAX_ITERATIONS` - Optional. Maximum agent loop iterations. Defaults to `15`.
//! - `SESSION_TTL_SECS` - Optional. Idle time before a chat session is dropped. Defaults to `3600`.
//!
//! The Groq API key is deliberately absent: it is entered per browser session
//! and never read from the environment.

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "gemma2-9b-it";
pub const DEFAULT_WIKIPEDIA_API_URL: &str = "https://en.wikipedia.org/w/api.php";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Language model settings shared by the agent and every tool.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Base URL of the OpenAI-compatible API
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GROQ_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Language model settings
    pub model: ModelConfig,

    /// MediaWiki API endpoint used by the lookup tool
    pub wikipedia_api_url: String,

    /// Maximum iterations for the agent loop
    pub max_iterations: usize,

    /// Idle lifetime of a chat session
    pub session_ttl: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = parse_var("PORT", "8501")?;

        let model = ModelConfig {
            base_url: std::env::var("GROQ_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GROQ_BASE_URL.to_string()),
            model: std::env::var("DEFAULT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            temperature: parse_var("MODEL_TEMPERATURE", "0.7")?,
        };

        let wikipedia_api_url = std::env::var("WIKIPEDIA_API_URL")
            .unwrap_or_else(|_| DEFAULT_WIKIPEDIA_API_URL.to_string());

        let max_iterations: usize = parse_var("MAX_ITERATIONS", "15")?;
        if max_iterations == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_ITERATIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let session_ttl = Duration::from_secs(parse_var("SESSION_TTL_SECS", "3600")?);

        Ok(Self {
            host,
            port,
            model,
            wikipedia_api_url,
            max_iterations,
            session_ttl,
        })
    }

    /// Create a config with default values (useful for testing).
    pub fn new() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            model: ModelConfig::default(),
            wikipedia_api_url: DEFAULT_WIKIPEDIA_API_URL.to_string(),
            max_iterations: 15,
            session_ttl: Duration::from_secs(3600),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_var<T>(name: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(name).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e)))
}
