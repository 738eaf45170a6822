//! warelay core library — config, recipient normalization, bridge session,
//! and the HTTP API used by the CLI.

pub mod api;
pub mod config;
pub mod jid;
pub mod session;
