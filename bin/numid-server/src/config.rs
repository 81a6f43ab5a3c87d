//! Server configuration, loaded from environment variables at startup.

use std::fmt;

use numid_core::gemini::DEFAULT_BASE_URL;
use numid_core::{DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT};

/// Environment variable holding the upstream credential.
pub const API_KEY_VAR: &str = "GOOGLE_GEMINI_API_KEY";

/// Runtime configuration for numid-server.
///
/// Everything except the API key has a default, so a `.env` file with just
/// `GOOGLE_GEMINI_API_KEY=...` is enough to run.
#[derive(Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3001"`).
    pub bind_address: String,

    /// Gemini API key. Startup fails when it is missing.
    pub api_key: Option<String>,

    /// Base URL of the Gemini REST API, without a trailing slash.
    pub gemini_base_url: String,

    /// Model used when a request does not name one.
    pub default_model: String,

    /// System instruction sent with every upstream call.
    pub system_prompt: String,

    /// Maximum accepted request body in bytes (default 10 MiB).
    pub body_limit: usize,

    /// Frames buffered between the upstream reader and a slow SSE client.
    pub stream_buffer: usize,

    /// Comma-separated CORS origins; `None` allows any origin.
    pub cors_allowed_origins: Option<String>,

    /// Serve the OpenAPI document at `/api-docs/openapi.json`.
    pub enable_docs: bool,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3001".to_owned(),
            api_key: None,
            gemini_base_url: DEFAULT_BASE_URL.to_owned(),
            default_model: DEFAULT_MODEL.to_owned(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_owned(),
            body_limit: 10 * 1024 * 1024,
            stream_buffer: 32,
            cors_allowed_origins: None,
            enable_docs: true,
            log_level: "info".to_owned(),
            log_json: false,
        }
    }
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            bind_address: env_or("NUMID_BIND", &d.bind_address),
            api_key: std::env::var(API_KEY_VAR).ok().filter(|k| !k.trim().is_empty()),
            gemini_base_url: env_or("NUMID_GEMINI_BASE_URL", &d.gemini_base_url),
            default_model: env_or("NUMID_DEFAULT_MODEL", &d.default_model),
            system_prompt: env_or("NUMID_SYSTEM_PROMPT", &d.system_prompt),
            body_limit: parse_env("NUMID_BODY_LIMIT", d.body_limit),
            stream_buffer: parse_env("NUMID_STREAM_BUFFER", d.stream_buffer),
            cors_allowed_origins: std::env::var("NUMID_CORS_ORIGINS").ok().filter(|v| !v.trim().is_empty()),
            enable_docs: parse_bool("NUMID_ENABLE_DOCS", d.enable_docs),
            log_level: env_or("NUMID_LOG", &d.log_level),
            log_json: parse_bool("NUMID_LOG_JSON", d.log_json),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("gemini_base_url", &self.gemini_base_url)
            .field("default_model", &self.default_model)
            .field("body_limit", &self.body_limit)
            .field("stream_buffer", &self.stream_buffer)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("enable_docs", &self.enable_docs)
            .field("log_level", &self.log_level)
            .field("log_json", &self.log_json)
            .finish_non_exhaustive()
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}
