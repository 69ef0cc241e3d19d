//! HTTP surface: the server-rendered chat page plus a small JSON/SSE API.
//!
//! ## Endpoints
//!
//! - `GET /` - Chat page for the caller's session
//! - `POST /credential` - Store the Groq API key for the session
//! - `POST /ask` - Submit a question from the page
//! - `GET /api/health` - Health check
//! - `GET /api/session` - Session transcript as JSON
//! - `POST /api/ask` - Submit a question and stream agent steps (SSE)

mod handlers;
pub mod page;
pub mod routes;
pub mod types;

pub use handlers::{session_id_from, SESSION_COOKIE};
pub use routes::{router, serve, AppState};
