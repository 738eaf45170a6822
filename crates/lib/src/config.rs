//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.warelay/config.json`) and environment.
//! Kept minimal: API bind/port/auth, bridge endpoint, and bulk-send timing.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP API server settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// WhatsApp Web bridge endpoint settings.
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// Outbound send behavior (bulk delay).
    #[serde(default)]
    pub sending: SendingConfig,
}

/// API bind, port, and auth settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    /// Port for the HTTP API (default 3000).
    #[serde(default = "default_api_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_api_bind")]
    pub bind: String,

    /// Auth settings. When absent, defaults to no auth for loopback bind.
    #[serde(default)]
    pub auth: ApiAuthConfig,
}

/// API auth: token or none (loopback-only when none).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAuthConfig {
    /// "none" = no shared secret (only safe when bind is loopback). "token" = require Authorization: Bearer.
    #[serde(default)]
    pub mode: ApiAuthMode,

    /// Shared secret for send endpoints. Overridden by WARELAY_API_TOKEN env.
    pub token: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiAuthMode {
    /// No auth; allow only when bind is loopback.
    #[default]
    None,

    /// Require Authorization: Bearer token on send endpoints.
    Token,
}

fn default_api_port() -> u16 {
    3000
}

fn default_api_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: default_api_port(),
            bind: default_api_bind(),
            auth: ApiAuthConfig::default(),
        }
    }
}

/// WhatsApp Web bridge endpoint: base URL, API key, instance name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Bridge REST base URL (default "http://127.0.0.1:8085").
    #[serde(default = "default_bridge_base_url")]
    pub base_url: String,

    /// Bridge API key (`apikey` header). Overridden by WARELAY_BRIDGE_API_KEY env.
    pub api_key: Option<String>,

    /// Bridge instance name for the paired WhatsApp account (default "warelay").
    #[serde(default = "default_bridge_instance")]
    pub instance: String,
}

fn default_bridge_base_url() -> String {
    "http://127.0.0.1:8085".to_string()
}

fn default_bridge_instance() -> String {
    "warelay".to_string()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: default_bridge_base_url(),
            api_key: None,
            instance: default_bridge_instance(),
        }
    }
}

/// Outbound send behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendingConfig {
    /// Fixed delay between successive sends in bulk endpoints, in milliseconds (default 1000).
    #[serde(default = "default_bulk_delay_ms")]
    pub bulk_delay_ms: u64,
}

fn default_bulk_delay_ms() -> u64 {
    1000
}

impl Default for SendingConfig {
    fn default() -> Self {
        Self {
            bulk_delay_ms: default_bulk_delay_ms(),
        }
    }
}

/// Resolve the API token: env WARELAY_API_TOKEN overrides config.
pub fn resolve_api_token(config: &Config) -> Option<String> {
    std::env::var("WARELAY_API_TOKEN")
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            config
                .api
                .auth
                .token
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve the bridge API key: env WARELAY_BRIDGE_API_KEY overrides config.
pub fn resolve_bridge_api_key(config: &Config) -> Option<String> {
    std::env::var("WARELAY_BRIDGE_API_KEY")
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            config
                .bridge
                .api_key
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// True if the bind address is loopback (127.0.0.1, ::1, etc.).
pub fn is_loopback_bind(bind: &str) -> bool {
    let b = bind.trim();
    b == "127.0.0.1" || b == "::1" || b == "localhost"
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("WARELAY_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".warelay").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the default path (or WARELAY_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
