//! External WhatsApp session access.
//!
//! Session trait and the bridge-backed implementation so the API layer can
//! send messages without knowing the bridge contract. QR pairing and the Web
//! protocol live in the bridge process; we observe state and forward sends.

mod bridge;
mod handle;

pub use bridge::{BridgeError, BridgeSession};
pub use handle::{SessionHandle, SessionStatus};
