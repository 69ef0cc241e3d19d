//! HTTP handlers for the chat page and its JSON/SSE twin.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse, Redirect, Response,
    },
    Form, Json,
};
use futures::Stream;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::page::{self, Banner, PageView};
use super::routes::AppState;
use super::types::{AskForm, AskRequest, CredentialForm, HealthResponse, SessionResponse};
use crate::agent::{AgentEvent, StepSink};
use crate::chat::{
    submit, SharedSession, SubmitOutcome, EMPTY_QUESTION_MESSAGE, MISSING_CREDENTIAL_MESSAGE,
};

pub const SESSION_COOKIE: &str = "crackmaths_session";

/// Read the session id from the request cookies.
pub fn session_id_from(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

fn session_cookie(id: Uuid) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}

/// Find the caller's session, creating one (and a cookie for it) if needed.
async fn resolve_session(state: &AppState, headers: &HeaderMap) -> (SharedSession, Option<String>) {
    let (session, created) = state.sessions.get_or_create(session_id_from(headers)).await;
    let cookie = if created {
        Some(session_cookie(session.lock().await.id()))
    } else {
        None
    };
    (session, cookie)
}

fn with_cookie(mut response: Response, cookie: Option<String>) -> Response {
    if let Some(cookie) = cookie {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().insert(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Failed to build session cookie: {}", e),
        }
    }
    response
}

/// GET / - Render the page for the current session.
///
/// Never waits on an in-flight turn.
pub async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (session, cookie) = resolve_session(&state, &headers).await;
    let Ok(mut session) = session.try_lock() else {
        tracing::debug!("Session has a turn in flight; rendering busy page");
        let html = page::render(&PageView {
            busy: true,
            ..Default::default()
        });
        return with_cookie(Html(html).into_response(), cookie);
    };
    session.touch();

    let html = page::render(&PageView {
        has_credential: session.credential().is_some(),
        turns: session.turns(),
        ..Default::default()
    });
    with_cookie(Html(html).into_response(), cookie)
}

/// POST /credential - Store (or clear) the session's API key.
pub async fn set_credential(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<CredentialForm>,
) -> Response {
    let (session, cookie) = resolve_session(&state, &headers).await;
    let mut session = session.lock().await;
    session.set_credential(&form.api_key);
    tracing::info!(
        session_id = %session.id(),
        has_credential = session.credential().is_some(),
        "Updated session credential"
    );
    with_cookie(Redirect::to("/").into_response(), cookie)
}

/// POST /ask - Submit a question from the page form.
pub async fn ask(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<AskForm>,
) -> Response {
    let (session, cookie) = resolve_session(&state, &headers).await;
    let mut session = session.lock().await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let outcome = submit(
        &mut session,
        &form.question,
        state.solvers.as_ref(),
        &StepSink::new(tx),
    )
    .await;

    let mut steps = Vec::new();
    while let Ok(event) = rx.try_recv() {
        steps.push(event);
    }

    let (banner, response) = match &outcome {
        SubmitOutcome::CredentialMissing => (
            Some(Banner::Info(MISSING_CREDENTIAL_MESSAGE.to_string())),
            None,
        ),
        SubmitOutcome::EmptyQuestion => (
            Some(Banner::Warning(EMPTY_QUESTION_MESSAGE.to_string())),
            None,
        ),
        SubmitOutcome::Answered { answer } => (None, Some(answer.as_str())),
        SubmitOutcome::Failed { message } => (Some(Banner::Error(message.clone())), None),
    };

    let html = page::render(&PageView {
        busy: false,
        has_credential: session.credential().is_some(),
        turns: session.turns(),
        question: Some(&form.question),
        banner,
        steps: &steps,
        response,
    });
    with_cookie(Html(html).into_response(), cookie)
}

/// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.config.model.model.clone(),
    })
}

async fn existing_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<SharedSession, (StatusCode, String)> {
    let id = session_id_from(headers)
        .ok_or_else(|| (StatusCode::NOT_FOUND, "No session cookie".to_string()))?;
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Session {} not found", id)))
}

/// GET /api/session - Transcript of the current session.
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, (StatusCode, String)> {
    let session = existing_session(&state, &headers).await?;
    let session = session.lock().await;
    Ok(Json(SessionResponse {
        id: session.id(),
        has_credential: session.credential().is_some(),
        phase: session.phase(),
        turns: session.turns().to_vec(),
    }))
}

/// POST /api/ask - Submit a question and stream agent steps via SSE.
pub async fn ask_stream(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<AskRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, (StatusCode, String)> {
    let session = existing_session(&state, &headers)
        .await
        .map_err(|_| (StatusCode::UNAUTHORIZED, MISSING_CREDENTIAL_MESSAGE.to_string()))?;

    if session.lock().await.credential().is_none() {
        return Err((StatusCode::UNAUTHORIZED, MISSING_CREDENTIAL_MESSAGE.to_string()));
    }
    if req.question.trim().is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            EMPTY_QUESTION_MESSAGE.to_string(),
        ));
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let solvers = state.solvers.clone();
    tokio::spawn(async move {
        let mut session = session.lock().await;
        let sink = StepSink::new(tx);
        let outcome = submit(&mut session, &req.question, solvers.as_ref(), &sink).await;
        // The key may have been cleared between the check above and taking the lock.
        if outcome == SubmitOutcome::CredentialMissing {
            sink.emit(AgentEvent::Error {
                message: MISSING_CREDENTIAL_MESSAGE.to_string(),
            });
        }
    });

    let stream = async_stream::stream! {
        while let Some(event) = rx.recv().await {
            match Event::default().event(event.event_name()).json_data(&event) {
                Ok(sse) => yield Ok::<_, Infallible>(sse),
                Err(e) => {
                    tracing::error!(
                        event = %event.event_name(),
                        error = %e,
                        "Failed to serialize SSE event; dropping"
                    );
                }
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keepalive"),
    ))
}
