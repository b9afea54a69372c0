//! SSE transport: HTTP event stream plus a POST message endpoint.
//!
//! A client opens `GET {sse_path}` and receives an `endpoint` event naming
//! the POST URL for this session (`{message_path}?session_id=...`). Client
//! messages arrive over that POST endpoint; server responses are pushed onto
//! the session's event stream as `message` events. The POST itself only
//! acknowledges receipt with 202.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Router,
};
use dashmap::DashMap;
use futures_util::stream::Stream;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::health::health_handler;
use crate::problem::ProblemDetails;
use crate::server::McpServer;

/// Per-session outbound message channel capacity.
const SESSION_CHANNEL_CAPACITY: usize = 64;

/// Interval between keep-alive comments on idle streams.
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

type SessionMap = Arc<DashMap<Uuid, mpsc::Sender<String>>>;

/// Shared state for the axum application.
#[derive(Clone)]
pub struct SseState {
    server: Arc<McpServer>,
    sessions: SessionMap,
    message_path: String,
}

impl SseState {
    pub fn new(server: Arc<McpServer>, message_path: impl Into<String>) -> Self {
        Self {
            server,
            sessions: Arc::new(DashMap::new()),
            message_path: message_path.into(),
        }
    }

    /// Number of currently open sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

/// Build the SSE application router for the given configuration.
pub fn router(server: Arc<McpServer>, config: &ServerConfig) -> Router {
    let state = SseState::new(server, config.message_path.clone());

    let mut app = Router::new()
        .route(&config.sse_path, get(sse_handler))
        .route(&config.message_path, post(message_handler))
        .route("/health", get(health_handler));

    // Mount the trailing-slash twin so clients that append one are not
    // redirected mid-handshake.
    let twin = config.message_path_with_slash();
    if twin != config.message_path {
        app = app.route(&twin, post(message_handler));
    }

    app.layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the SSE transport until the process is stopped.
pub async fn run_sse_server(config: &ServerConfig, server: McpServer) -> Result<()> {
    let app = router(Arc::new(server), config);

    let addr: SocketAddr = config
        .bind_addr()
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.bind_addr()))?;

    info!(
        addr = %addr,
        sse_path = %config.sse_path,
        message_path = %config.message_path,
        "starting SSE transport"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listener")?;
    axum::serve(listener, app).await.context("HTTP server error")?;

    Ok(())
}

// RAII guard so a session is unregistered however its stream ends.
struct SessionGuard {
    session_id: Uuid,
    sessions: SessionMap,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        debug!(session_id = %self.session_id, "removing session from registry");
        self.sessions.remove(&self.session_id);
    }
}

async fn sse_handler(
    State(state): State<SseState>,
) -> impl IntoResponse {
    let session_id = Uuid::new_v4();
    info!(%session_id, "new SSE session");

    let (tx, mut rx) = mpsc::channel::<String>(SESSION_CHANNEL_CAPACITY);
    state.sessions.insert(session_id, tx);

    let guard = SessionGuard {
        session_id,
        sessions: state.sessions.clone(),
    };

    let endpoint = format!(
        "{}?session_id={}",
        state.message_path,
        session_id.simple()
    );

    let stream = async_stream::stream! {
        let _guard = guard;

        yield Ok(Event::default().event("endpoint").data(endpoint));

        while let Some(message) = rx.recv().await {
            yield Ok(Event::default().event("message").data(message));
        }

        info!(%session_id, "SSE stream ended");
    };

    let boxed: Pin<Box<dyn Stream<Item = Result<Event, Infallible>> + Send>> = Box::pin(stream);
    Sse::new(boxed).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("keep-alive"),
    )
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(default)]
    session_id: Option<String>,
}

async fn message_handler(
    State(state): State<SseState>,
    Query(query): Query<MessageQuery>,
    body: String,
) -> Response {
    let request_id = format!("req-{}", Uuid::new_v4().simple());

    let raw_session = match query.session_id {
        Some(raw) => raw,
        None => {
            warn!("message rejected: missing session_id");
            return ProblemDetails::bad_request("missing session_id query parameter", &request_id)
                .into_response();
        }
    };

    let session_id = match Uuid::parse_str(&raw_session) {
        Ok(id) => id,
        Err(_) => {
            warn!(session = %raw_session, "message rejected: malformed session_id");
            return ProblemDetails::bad_request(
                format!("malformed session_id: {}", raw_session),
                &request_id,
            )
            .into_response();
        }
    };

    // Clone the sender out of the map so the entry lock is not held across
    // the dispatch await.
    let tx = match state.sessions.get(&session_id).map(|e| e.value().clone()) {
        Some(tx) => tx,
        None => {
            warn!(%session_id, "message rejected: unknown session");
            return ProblemDetails::unknown_session(&raw_session, &request_id).into_response();
        }
    };

    debug!(%session_id, body_len = body.len(), "dispatching client message");

    if let Some(response) = state.server.process_message(&body).await {
        if tx.send(response).await.is_err() {
            state.sessions.remove(&session_id);
            warn!(%session_id, "session stream closed while dispatching");
            return ProblemDetails::session_closed(&raw_session, &request_id).into_response();
        }
    }

    (StatusCode::ACCEPTED, "Accepted").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use azure_pricing_lib::RetailPriceClient;

    fn test_state() -> SseState {
        let client = RetailPriceClient::with_endpoint("http://127.0.0.1:9/prices").unwrap();
        SseState::new(Arc::new(McpServer::new(client)), "/messages")
    }

    #[test]
    fn test_session_guard_removes_entry() {
        let state = test_state();
        let session_id = Uuid::new_v4();
        let (tx, _rx) = mpsc::channel(1);
        state.sessions.insert(session_id, tx);
        assert_eq!(state.session_count(), 1);

        drop(SessionGuard {
            session_id,
            sessions: state.sessions.clone(),
        });
        assert_eq!(state.session_count(), 0);
    }

    #[test]
    fn test_endpoint_event_format() {
        let session_id = Uuid::new_v4();
        let endpoint = format!("/messages?session_id={}", session_id.simple());
        assert!(endpoint.starts_with("/messages?session_id="));
        // The simple format is parseable back into the same id.
        let raw = endpoint.rsplit('=').next().unwrap();
        assert_eq!(Uuid::parse_str(raw).unwrap(), session_id);
    }

    #[test]
    fn test_router_builds_with_custom_paths() {
        let config = ServerConfig {
            sse_path: "/events".to_string(),
            message_path: "/mcp".to_string(),
            ..ServerConfig::default()
        };
        let client = RetailPriceClient::with_endpoint("http://127.0.0.1:9/prices").unwrap();
        let _router = router(Arc::new(McpServer::new(client)), &config);
    }
}
