use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ArrivaError, Result};

/// Environment variable holding the shared client token.
pub const ENV_AUTH_TOKEN: &str = "AUTH_TOKEN";
/// Environment variable holding the places API key.
pub const ENV_PLACES_API_KEY: &str = "GOOGLE_PLACES_API_KEY";
/// Environment variable holding the conversational-AI API key.
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Returns the base directory for arriva data.
///
/// Uses `$ARRIVA_HOME` if set, otherwise defaults to `~/.arriva`.
pub fn arriva_home() -> PathBuf {
    if let Ok(home) = std::env::var("ARRIVA_HOME") {
        return PathBuf::from(home);
    }

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".arriva")
}

/// Returns the path to the relay configuration file.
pub fn config_path() -> PathBuf {
    arriva_home().join("config.toml")
}

/// Relay settings. Secrets may live in the file but the environment wins.
#[derive(Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Host address for the HTTP server (default: 127.0.0.1)
    #[serde(default = "default_host")]
    pub host: String,

    /// Port for the HTTP server (default: 5001)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared token every client request must carry
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Server-held places API key
    #[serde(default)]
    pub places_api_key: Option<String>,

    /// Server-held conversational-AI API key
    #[serde(default)]
    pub openai_api_key: Option<String>,

    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    #[serde(default = "default_places_base_url")]
    pub places_base_url: String,

    /// Realtime model requested for issued credentials
    #[serde(default = "default_realtime_model")]
    pub realtime_model: String,

    /// Upper bound on requests served concurrently
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Largest request body buffered while looking for a body token
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Photo width used when the client omits `maxwidth`
    #[serde(default = "default_photo_max_width")]
    pub default_photo_max_width: u32,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_places_base_url() -> String {
    "https://maps.googleapis.com/maps/api/place".to_string()
}

fn default_realtime_model() -> String {
    "gpt-realtime".to_string()
}

fn default_max_concurrent_requests() -> usize {
    10
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_photo_max_width() -> u32 {
    800
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            auth_token: None,
            places_api_key: None,
            openai_api_key: None,
            openai_base_url: default_openai_base_url(),
            places_base_url: default_places_base_url(),
            realtime_model: default_realtime_model(),
            max_concurrent_requests: default_max_concurrent_requests(),
            max_body_bytes: default_max_body_bytes(),
            default_photo_max_width: default_photo_max_width(),
        }
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("auth_token", &redact(&self.auth_token))
            .field("places_api_key", &redact(&self.places_api_key))
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("openai_base_url", &self.openai_base_url)
            .field("places_base_url", &self.places_base_url)
            .field("realtime_model", &self.realtime_model)
            .field("max_concurrent_requests", &self.max_concurrent_requests)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("default_photo_max_width", &self.default_photo_max_width)
            .finish()
    }
}

fn redact(secret: &Option<String>) -> &'static str {
    match secret {
        Some(s) if !s.is_empty() => "<set>",
        _ => "<missing>",
    }
}

impl RelayConfig {
    /// Load configuration from the default config file path, then apply
    /// secrets from the process environment.
    pub fn load() -> Result<Self> {
        let config = Self::load_from(&config_path())?;
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Load configuration from `path`.
    /// Returns default config if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| {
                ArrivaError::Config(format!(
                    "Failed to read config file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            let config: RelayConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Overlay secrets found through `lookup` (normally the environment).
    /// Empty values are ignored.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(v) = read(ENV_AUTH_TOKEN) {
            self.auth_token = Some(v);
        }
        if let Some(v) = read(ENV_PLACES_API_KEY) {
            self.places_api_key = Some(v);
        }
        if let Some(v) = read(ENV_OPENAI_API_KEY) {
            self.openai_api_key = Some(v);
        }
        self
    }

    /// Returns the server bind address string (e.g., "127.0.0.1:5001").
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Names of the secrets that are absent or empty.
    pub fn missing_secrets(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.auth_token) {
            missing.push(ENV_AUTH_TOKEN);
        }
        if is_blank(&self.places_api_key) {
            missing.push(ENV_PLACES_API_KEY);
        }
        if is_blank(&self.openai_api_key) {
            missing.push(ENV_OPENAI_API_KEY);
        }
        missing
    }

    /// Log every missing secret. The relay keeps running; affected calls
    /// fail when they are made.
    pub fn report_missing(&self) {
        for name in self.missing_secrets() {
            tracing::error!("Missing {name}!");
        }
    }

    /// Human-readable configuration with secrets masked.
    pub fn redacted(&self) -> String {
        format!("{self:#?}")
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}
