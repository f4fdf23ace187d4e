//! HTTP server (Axum).
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/chat` | Answer `{ "message": "..." }` with `{ "ok": true, "response": "..." }` |
//! | `GET`  | `/status` | Corpus and history counts |
//! | `GET`  | `/history` | Recorded turns, optionally `?limit=n` |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! Any other `GET` is served from `server.static_dir` when configured.
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "invalid JSON body: ..." } }
//! ```
//!
//! A missing body or a missing/`null` `message` is not an error: it is
//! answered as the empty message.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a browser UI served
//! from elsewhere can call the API.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chatran_core::{Engine, HistoryEntry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::app::build_engine;
use crate::config::Config;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    engine: Arc<Engine>,
}

/// Starts the Chatran HTTP server.
///
/// Builds the [`Engine`] from `config` (corpus, history backend, fallback
/// rules), binds to `[server].bind` and serves until the process is
/// terminated. This is the entry point used by the `chatran serve` command.
///
/// # Arguments
///
/// - `config`: application configuration (corpus sources, history backend, bind address).
///
/// # Returns
///
/// Returns `Ok(())` when the server shuts down, or an error if the history
/// database cannot be opened or binding fails.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let engine = Arc::new(build_engine(config).await?);
    let listener = TcpListener::bind(&config.server.bind).await?;
    tracing::info!("Chatran server listening on http://{}", listener.local_addr()?);
    serve(engine, listener, config).await
}

/// Serves an already-built engine on an already-bound listener.
///
/// Like [`run_server`], but lets the caller own engine construction and
/// binding, e.g. to pick an ephemeral port.
///
/// # Arguments
///
/// - `engine`: the shared response engine.
/// - `listener`: a bound TCP listener.
/// - `config`: read for `[server].static_dir`.
///
/// # Returns
///
/// Returns `Ok(())` when the server shuts down, or an I/O error from the
/// accept loop.
pub async fn serve(
    engine: Arc<Engine>,
    listener: TcpListener,
    config: &Config,
) -> anyhow::Result<()> {
    axum::serve(listener, router(engine, config)).await?;
    Ok(())
}

/// Builds the route table.
///
/// Registers `/chat`, `/status`, `/history` and `/health`, applies the
/// permissive CORS layer, and mounts `[server].static_dir` as the fallback
/// service when configured. Exposed so the router can be nested in another
/// Axum application.
pub fn router(engine: Arc<Engine>, config: &Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/chat", post(handle_chat))
        .route("/status", get(handle_status))
        .route("/history", get(handle_history))
        .route("/health", get(handle_health));

    if let Some(dir) = &config.server.static_dir {
        tracing::info!(dir = %dir.display(), "serving static files");
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(cors).with_state(AppState { engine })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

// ============ POST /chat ============

#[derive(Debug, Default, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    ok: bool,
    response: String,
}

/// Parse the raw request body. An empty body is an empty message.
fn parse_chat_request(body: &[u8]) -> Result<ChatRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ChatRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| bad_request(format!("invalid JSON body: {}", e)))
}

async fn handle_chat(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatResponse>, AppError> {
    let request = parse_chat_request(&body)?;
    let message = request.message.unwrap_or_default();
    let reply = state.engine.respond(&message).await;
    Ok(Json(ChatResponse {
        ok: true,
        response: reply.response,
    }))
}

// ============ GET /status ============

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    ok: bool,
    dataset_count: usize,
    history_count: usize,
}

async fn handle_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let status = state.engine.status();
    Json(StatusResponse {
        ok: true,
        dataset_count: status.corpus_count,
        history_count: status.history_count,
    })
}

// ============ GET /history ============

#[derive(Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

#[derive(Serialize)]
struct HistoryResponse {
    ok: bool,
    history: Vec<HistoryEntry>,
}

async fn handle_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Json<HistoryResponse> {
    let log = state.engine.history();
    let history = match query.limit {
        Some(n) => log.tail(n),
        None => log.read_all(),
    };
    Json(HistoryResponse { ok: true, history })
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
