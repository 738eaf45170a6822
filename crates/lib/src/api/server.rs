//! API HTTP server: the four send endpoints plus health and status.

use crate::api::protocol::{
    ApiResponse, BulkMediaParams, BulkTextParams, SendMediaParams, SendMessageParams,
};
use crate::config::{self, Config};
use crate::jid;
use crate::session::{BridgeSession, SessionHandle, SessionStatus};
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handler result: status code plus the success/error JSON shape.
type ApiResult = (StatusCode, Json<ApiResponse>);

/// Shared state for the API (config, session handle, resolved auth token).
#[derive(Clone)]
pub struct ApiState {
    pub config: Arc<Config>,
    /// The outbound session. Production uses the bridge; tests may stub this.
    pub session: Arc<dyn SessionHandle>,
    /// When Some, send endpoints must provide a matching Authorization: Bearer token.
    pub required_token: Option<String>,
    /// Process start time, reported by /status.
    pub started_at: chrono::DateTime<chrono::Utc>,
}

/// When auth mode is token and a token is configured, returns it for request validation.
fn require_api_token(config: &Config) -> Option<String> {
    if config.api.auth.mode == config::ApiAuthMode::Token {
        config::resolve_api_token(config)
    } else {
        None
    }
}

fn ok_response(message: &str) -> ApiResult {
    (StatusCode::OK, Json(ApiResponse::ok(message)))
}

fn bad_request(error: impl Into<String>) -> ApiResult {
    (StatusCode::BAD_REQUEST, Json(ApiResponse::err(error)))
}

fn server_error(error: impl Into<String>) -> ApiResult {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiResponse::err(error)))
}

/// Trim an optional field; blank counts as missing.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// When a token is required, the Authorization header must carry it as Bearer.
fn authorize(state: &ApiState, headers: &HeaderMap) -> Result<(), ApiResult> {
    let Some(ref required) = state.required_token else {
        return Ok(());
    };
    let provided = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("")
        .trim();
    if provided != required {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::err("unauthorized: api token missing or mismatched")),
        ));
    }
    Ok(())
}

/// Sends require the watched session state to be ready.
fn ensure_ready(state: &ApiState) -> Result<(), ApiResult> {
    if state.session.status() == SessionStatus::Ready {
        Ok(())
    } else {
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse::err("whatsapp session not ready")),
        ))
    }
}

/// Normalize every recipient up front so a bad entry fails before any send.
fn normalize_all(phones: &[String]) -> Result<Vec<String>, ApiResult> {
    let mut jids = Vec::with_capacity(phones.len());
    for phone in phones {
        match jid::normalize_recipient(phone) {
            Ok(j) => jids.push(j),
            Err(e) => return Err(bad_request(e)),
        }
    }
    Ok(jids)
}

/// POST /send-message — text to one recipient.
async fn send_message(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(params): Json<SendMessageParams>,
) -> ApiResult {
    if let Err(res) = authorize(&state, &headers) {
        return res;
    }
    let Some(phone) = non_blank(params.phone) else {
        return bad_request("Phone and message required");
    };
    let Some(message) = non_blank(params.message) else {
        return bad_request("Phone and message required");
    };
    if let Err(res) = ensure_ready(&state) {
        return res;
    }
    let to = match jid::normalize_recipient(&phone) {
        Ok(j) => j,
        Err(e) => return bad_request(e),
    };
    match state.session.send_text(&to, &message).await {
        Ok(()) => ok_response("Message sent!"),
        Err(e) => {
            log::warn!("send-message to {} failed: {}", to, e);
            server_error(e)
        }
    }
}

/// POST /send-media — media by URL (optional caption) to one recipient.
async fn send_media(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(params): Json<SendMediaParams>,
) -> ApiResult {
    if let Err(res) = authorize(&state, &headers) {
        return res;
    }
    let Some(phone) = non_blank(params.phone) else {
        return bad_request("Phone and fileUrl required");
    };
    let Some(file_url) = non_blank(params.file_url) else {
        return bad_request("Phone and fileUrl required");
    };
    if let Err(res) = ensure_ready(&state) {
        return res;
    }
    let to = match jid::normalize_recipient(&phone) {
        Ok(j) => j,
        Err(e) => return bad_request(e),
    };
    let caption = params.caption.unwrap_or_default();
    match state.session.send_media(&to, &file_url, &caption).await {
        Ok(()) => ok_response("Media sent!"),
        Err(e) => {
            log::warn!("send-media to {} failed: {}", to, e);
            server_error(e)
        }
    }
}

/// POST /send-multiple-text — text to each recipient, fixed delay between sends.
async fn send_multiple_text(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(params): Json<BulkTextParams>,
) -> ApiResult {
    if let Err(res) = authorize(&state, &headers) {
        return res;
    }
    let phones = params.phones.unwrap_or_default();
    let Some(message) = non_blank(params.message) else {
        return bad_request("Phones and message required");
    };
    if phones.is_empty() {
        return bad_request("Phones and message required");
    }
    if let Err(res) = ensure_ready(&state) {
        return res;
    }
    let jids = match normalize_all(&phones) {
        Ok(j) => j,
        Err(res) => return res,
    };
    for (i, to) in jids.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(bulk_delay(&state)).await;
        }
        if let Err(e) = state.session.send_text(to, &message).await {
            log::warn!("send-multiple-text to {} failed: {}", to, e);
            return server_error(format!("sending to {} failed: {}", phones[i], e));
        }
    }
    ok_response("Messages sent!")
}

/// POST /send-multiple-media — media by URL to each recipient, fixed delay between sends.
async fn send_multiple_media(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(params): Json<BulkMediaParams>,
) -> ApiResult {
    if let Err(res) = authorize(&state, &headers) {
        return res;
    }
    let phones = params.phones.unwrap_or_default();
    let Some(file_url) = non_blank(params.file_url) else {
        return bad_request("Phones and fileUrl required");
    };
    if phones.is_empty() {
        return bad_request("Phones and fileUrl required");
    }
    if let Err(res) = ensure_ready(&state) {
        return res;
    }
    let jids = match normalize_all(&phones) {
        Ok(j) => j,
        Err(res) => return res,
    };
    let caption = params.caption.unwrap_or_default();
    for (i, to) in jids.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(bulk_delay(&state)).await;
        }
        if let Err(e) = state.session.send_media(to, &file_url, &caption).await {
            log::warn!("send-multiple-media to {} failed: {}", to, e);
            return server_error(format!("sending to {} failed: {}", phones[i], e));
        }
    }
    ok_response("Media messages sent!")
}

fn bulk_delay(state: &ApiState) -> tokio::time::Duration {
    tokio::time::Duration::from_millis(state.config.sending.bulk_delay_ms)
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "session": state.session.status(),
        "port": state.config.api.port,
    }))
}

/// GET /status returns health plus bridge endpoint and send settings.
async fn status_http(State(state): State<ApiState>) -> Json<serde_json::Value> {
    let auth_mode = if state.required_token.is_some() {
        "token"
    } else {
        "none"
    };
    Json(json!({
        "runtime": "running",
        "session": state.session.status(),
        "port": state.config.api.port,
        "bind": state.config.api.bind,
        "auth": auth_mode,
        "bridge": {
            "baseUrl": state.config.bridge.base_url,
            "instance": state.config.bridge.instance,
        },
        "bulkDelayMs": state.config.sending.bulk_delay_ms,
        "startedAt": state.started_at.to_rfc3339(),
    }))
}

/// Run the API server; binds to config.api.bind:config.api.port.
/// Constructs the bridge session from config and starts its watch loop.
/// Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_api(config: Config) -> Result<()> {
    let api_key = config::resolve_bridge_api_key(&config);
    let session = Arc::new(BridgeSession::new(
        Some(config.bridge.base_url.clone()),
        api_key,
        config.bridge.instance.clone(),
    ));
    let watch_task = session.clone().start_watch();
    run_api_with_session(config, session, vec![watch_task]).await
}

/// Run the API server with an already-constructed session.
/// When bind is not loopback, an API token must be configured or startup fails.
pub async fn run_api_with_session(
    config: Config,
    session: Arc<dyn SessionHandle>,
    session_tasks: Vec<JoinHandle<()>>,
) -> Result<()> {
    let bind = config.api.bind.trim().to_string();
    if !config::is_loopback_bind(&bind) {
        let token = config::resolve_api_token(&config);
        if token.is_none() || config.api.auth.mode != config::ApiAuthMode::Token {
            anyhow::bail!(
                "refusing to bind api to {} without auth (set api.auth.mode to \"token\" and api.auth.token or WARELAY_API_TOKEN)",
                bind
            );
        }
    }

    let required_token = require_api_token(&config);
    let state = ApiState {
        config: Arc::new(config.clone()),
        session: session.clone(),
        required_token,
        started_at: chrono::Utc::now(),
    };

    let app = Router::new()
        .route("/", get(health_http))
        .route("/status", get(status_http))
        .route("/send-message", post(send_message))
        .route("/send-media", post(send_media))
        .route("/send-multiple-text", post(send_multiple_text))
        .route("/send-multiple-media", post(send_multiple_media))
        .with_state(state);

    let bind_addr = format!("{}:{}", bind, config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("api listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(session, session_tasks))
        .await
        .context("api server exited")?;
    log::info!("api stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
/// Stops the session watch loop, then awaits its task.
async fn shutdown_signal(session: Arc<dyn SessionHandle>, session_tasks: Vec<JoinHandle<()>>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, stopping session watch");

    session.stop();
    for h in session_tasks {
        let _ = h.await;
    }
    log::info!("session tasks finished");
}
