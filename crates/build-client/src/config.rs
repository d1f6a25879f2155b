//! Client configuration with YAML support

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Default versioned API host
pub const DEFAULT_API_URL: &str = "https://build.electricimp.com/v4/";
/// Default base host, used to resolve log poll cursors
pub const DEFAULT_BASE_URL: &str = "https://build.electricimp.com/";

/// Build API client configuration
///
/// Can be loaded from YAML or JSON, or constructed programmatically.
/// Immutable once handed to [`BuildClient`](crate::BuildClient).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Hosts and path segments
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
}

/// Hosts and per-resource path segments
///
/// Paths are single segments joined onto `api_url`; ids and versions are
/// appended as further segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Host that log poll cursors are relative to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Versioned API root used by every resource operation
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_models_path")]
    pub models: String,

    #[serde(default = "default_devices_path")]
    pub devices: String,

    #[serde(default = "default_revisions_path")]
    pub revisions: String,

    #[serde(default = "default_restart_path")]
    pub restart: String,

    #[serde(default = "default_logs_path")]
    pub logs: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_url: default_api_url(),
            models: default_models_path(),
            devices: default_devices_path(),
            revisions: default_revisions_path(),
            restart: default_restart_path(),
            logs: default_logs_path(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_models_path() -> String {
    "models".to_string()
}

fn default_devices_path() -> String {
    "devices".to_string()
}

fn default_revisions_path() -> String {
    "revisions".to_string()
}

fn default_restart_path() -> String {
    "restart".to_string()
}

fn default_logs_path() -> String {
    "logs".to_string()
}

/// Timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    /// Whole-request timeout in milliseconds (default: 30s)
    #[serde(default = "default_request_timeout")]
    pub request_ms: u64,

    /// Connect timeout in milliseconds (default: 10s)
    #[serde(default = "default_connect_timeout")]
    pub connect_ms: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            request_ms: default_request_timeout(),
            connect_ms: default_connect_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30_000 // 30 seconds
}

fn default_connect_timeout() -> u64 {
    10_000 // 10 seconds
}

impl TimeoutsConfig {
    pub fn request(&self) -> Duration {
        Duration::from_millis(self.request_ms)
    }

    pub fn connect(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }
}

impl ClientConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Serialize configuration to YAML
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Create a builder for programmatic configuration
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Parsed API root, normalized to end in `/`
    pub fn api_url(&self) -> Result<Url, ConfigError> {
        parse_directory_url(&self.endpoints.api_url)
    }

    /// Parsed base host, normalized to end in `/`
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        parse_directory_url(&self.endpoints.base_url)
    }
}

/// Without the trailing slash `Url::join` would replace the last segment
/// (`.../v4` + `models` = `.../models`).
fn parse_directory_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(format!(
            "{}: not usable as a base URL",
            raw
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point both hosts at one server (e.g. a local test server).
    ///
    /// The API root becomes `{server}/v4/`.
    pub fn server(mut self, server: &str) -> Self {
        let server = server.trim_end_matches('/');
        self.config.endpoints.base_url = format!("{}/", server);
        self.config.endpoints.api_url = format!("{}/v4/", server);
        self
    }

    /// Set the versioned API root
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.endpoints.api_url = url.into();
        self
    }

    /// Set the host poll cursors are resolved against
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.endpoints.base_url = url.into();
        self
    }

    /// Set request timeout in milliseconds
    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeouts.request_ms = ms;
        self
    }

    /// Set connect timeout in milliseconds
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeouts.connect_ms = ms;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
