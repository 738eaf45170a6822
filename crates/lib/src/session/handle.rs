//! Session handle: the seam between the API layer and the external session.

use async_trait::async_trait;
use serde::Serialize;

/// Connection state of the external WhatsApp session, as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Bridge reachable but the account is not linked yet (QR not scanned, or reconnecting).
    Connecting,
    /// Paired and connected; sends are expected to succeed.
    Ready,
    /// Bridge unreachable or the session was logged out.
    Disconnected,
}

/// Handle to an outbound messaging session (status, send, stop).
#[async_trait]
pub trait SessionHandle: Send + Sync {
    /// Session id (e.g. "whatsapp").
    fn id(&self) -> &str;
    /// Stop background work owned by the session (state watching).
    fn stop(&self);
    /// Last observed connection state. Never blocks on a probe.
    fn status(&self) -> SessionStatus;
    /// Send a text message to a normalized JID. Default returns error.
    async fn send_text(&self, _to: &str, _text: &str) -> Result<(), String> {
        Err("send not implemented".to_string())
    }
    /// Send media by URL (the session fetches it) with an optional caption. Default returns error.
    async fn send_media(&self, _to: &str, _file_url: &str, _caption: &str) -> Result<(), String> {
        Err("send not implemented".to_string())
    }
}
