//! WhatsApp Web bridge client: sendText/sendMedia and connection-state watching.
//!
//! The bridge process owns the paired account (QR pairing, Web protocol,
//! media fetching) and exposes a local REST API keyed by instance name.

use crate::session::handle::{SessionHandle, SessionStatus};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8085";
const WATCH_INTERVAL_SECS: u64 = 5;

const STATE_CONNECTING: u8 = 0;
const STATE_READY: u8 = 1;
const STATE_DISCONNECTED: u8 = 2;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("bridge request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("bridge api error: {0}")]
    Api(String),
}

/// Payload of GET /instance/connectionState/{instance}. The state string
/// appears nested or flat depending on the bridge version; accept both.
#[derive(Debug, Deserialize)]
struct ConnectionStateResponse {
    #[serde(default)]
    instance: Option<InstanceState>,
    #[serde(default)]
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InstanceState {
    #[serde(default)]
    state: Option<String>,
}

impl ConnectionStateResponse {
    fn state(&self) -> Option<&str> {
        self.instance
            .as_ref()
            .and_then(|i| i.state.as_deref())
            .or(self.state.as_deref())
    }
}

/// Map the bridge's state string to a session status.
fn status_from_state(state: &str) -> SessionStatus {
    match state {
        "open" | "connected" => SessionStatus::Ready,
        "close" | "closed" | "disconnected" | "logged_out" => SessionStatus::Disconnected,
        _ => SessionStatus::Connecting,
    }
}

/// Bridge-backed session: forwards sends to the bridge REST API and watches
/// the connection state on a fixed interval.
pub struct BridgeSession {
    id: String,
    base_url: String,
    api_key: Option<String>,
    instance: String,
    running: AtomicBool,
    state: AtomicU8,
    client: reqwest::Client,
}

impl BridgeSession {
    pub fn new(base_url: Option<String>, api_key: Option<String>, instance: String) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            id: "whatsapp".to_string(),
            base_url,
            api_key,
            instance,
            running: AtomicBool::new(false),
            state: AtomicU8::new(STATE_CONNECTING),
            client: reqwest::Client::new(),
        }
    }

    fn running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn set_state(&self, status: SessionStatus) {
        let v = match status {
            SessionStatus::Connecting => STATE_CONNECTING,
            SessionStatus::Ready => STATE_READY,
            SessionStatus::Disconnected => STATE_DISCONNECTED,
        };
        self.state.store(v, Ordering::SeqCst);
    }

    fn cached_state(&self) -> SessionStatus {
        match self.state.load(Ordering::SeqCst) {
            STATE_READY => SessionStatus::Ready,
            STATE_DISCONNECTED => SessionStatus::Disconnected,
            _ => SessionStatus::Connecting,
        }
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.api_key.as_deref() {
            Some(key) => builder.header("apikey", key),
            None => builder,
        }
    }

    /// Start the connection-state watch loop. Returns a handle to await on shutdown.
    pub fn start_watch(self: Arc<Self>) -> JoinHandle<()> {
        self.running.store(true, Ordering::SeqCst);
        log::info!(
            "bridge session: watching connection state at {} (instance {})",
            self.base_url,
            self.instance
        );
        tokio::spawn(async move {
            run_watch_loop(self).await;
        })
    }

    /// GET /instance/connectionState/{instance} — probe the bridge connection state.
    pub async fn connection_state(&self) -> Result<SessionStatus, BridgeError> {
        let url = format!("{}/instance/connectionState/{}", self.base_url, self.instance);
        let res = self.request(self.client.get(&url)).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(BridgeError::Api(format!(
                "connectionState failed: {} {}",
                status, body
            )));
        }
        let data: ConnectionStateResponse = res.json().await?;
        let state = data.state().unwrap_or("");
        Ok(status_from_state(state))
    }

    /// POST /message/sendText/{instance} — send a text message to a JID.
    pub async fn send_text(&self, to: &str, text: &str) -> Result<(), BridgeError> {
        let url = format!("{}/message/sendText/{}", self.base_url, self.instance);
        let body = serde_json::json!({ "number": to, "text": text });
        let res = self.request(self.client.post(&url).json(&body)).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(BridgeError::Api(format!("sendText failed: {} {}", status, body)));
        }
        Ok(())
    }

    /// POST /message/sendMedia/{instance} — send media by URL with an optional caption.
    /// The bridge downloads the file itself; we never touch the bytes.
    pub async fn send_media(&self, to: &str, file_url: &str, caption: &str) -> Result<(), BridgeError> {
        let url = format!("{}/message/sendMedia/{}", self.base_url, self.instance);
        let body = serde_json::json!({
            "number": to,
            "mediaUrl": file_url,
            "caption": caption,
        });
        let res = self.request(self.client.post(&url).json(&body)).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(BridgeError::Api(format!("sendMedia failed: {} {}", status, body)));
        }
        Ok(())
    }
}

async fn run_watch_loop(session: Arc<BridgeSession>) {
    while session.running() {
        let next = match session.connection_state().await {
            Ok(status) => status,
            Err(e) => {
                log::debug!("bridge connectionState probe failed: {}", e);
                SessionStatus::Disconnected
            }
        };
        let prev = session.cached_state();
        if next != prev {
            log::info!("whatsapp session state: {:?} -> {:?}", prev, next);
        }
        session.set_state(next);
        tokio::time::sleep(tokio::time::Duration::from_secs(WATCH_INTERVAL_SECS)).await;
    }
    log::info!("bridge session: watch loop stopped");
}

#[async_trait]
impl SessionHandle for BridgeSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn status(&self) -> SessionStatus {
        self.cached_state()
    }

    async fn send_text(&self, to: &str, text: &str) -> Result<(), String> {
        BridgeSession::send_text(self, to, text)
            .await
            .map_err(|e| e.to_string())
    }

    async fn send_media(&self, to: &str, file_url: &str, caption: &str) -> Result<(), String> {
        BridgeSession::send_media(self, to, file_url, caption)
            .await
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_string_mapping() {
        assert_eq!(status_from_state("open"), SessionStatus::Ready);
        assert_eq!(status_from_state("connected"), SessionStatus::Ready);
        assert_eq!(status_from_state("close"), SessionStatus::Disconnected);
        assert_eq!(status_from_state("logged_out"), SessionStatus::Disconnected);
        assert_eq!(status_from_state("connecting"), SessionStatus::Connecting);
        assert_eq!(status_from_state(""), SessionStatus::Connecting);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let s = BridgeSession::new(Some("http://127.0.0.1:9000/".to_string()), None, "x".to_string());
        assert_eq!(s.base_url, "http://127.0.0.1:9000");
    }
}
