//! Router, shared state and server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::chat::{GroqSolverFactory, SessionStore, SolverFactory};
use crate::config::Config;

/// How often idle sessions are swept.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    pub solvers: Arc<dyn SolverFactory>,
}

impl AppState {
    pub fn new(config: Config, sessions: SessionStore, solvers: Arc<dyn SolverFactory>) -> Self {
        Self {
            config,
            sessions,
            solvers,
        }
    }
}

/// Build the router over the given state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/credential", post(handlers::set_credential))
        .route("/ask", post(handlers::ask))
        .route("/api/health", get(handlers::health))
        .route("/api/session", get(handlers::get_session))
        .route("/api/ask", post(handlers::ask_stream))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server and run until it fails.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let http = reqwest::Client::builder()
        .user_agent(concat!("CrackMaths/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let sessions = SessionStore::new(config.session_ttl);
    let solvers = Arc::new(GroqSolverFactory::new(http, config.clone()));

    let sweeper = sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            sweeper.remove_expired().await;
        }
    });

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = Arc::new(AppState::new(config, sessions, solvers));
    let app = router(state);

    tracing::info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
