//! HTTP API: send endpoints plus health/status.
//!
//! Thin relay over the session: validate fields, check readiness, normalize
//! recipients, forward to the bridge, report the outcome.

mod protocol;
mod server;

pub use protocol::{ApiResponse, BulkMediaParams, BulkTextParams, SendMediaParams, SendMessageParams};
pub use server::{run_api, run_api_with_session, ApiState};
