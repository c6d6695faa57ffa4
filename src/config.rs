//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub voxx: VoxxConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote Voxx API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct VoxxConfig {
    /// Base URL for every Voxx endpoint (e.g., "https://www.vcp.cloud/v1")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Optional separate host for trip-detail lookups. Falls back to `base_url`.
    #[serde(default)]
    pub trip_detail_url: Option<String>,

    /// Value sent in the `partnerId` header on login
    #[serde(default = "default_partner_id")]
    pub partner_id: String,
}

fn default_base_url() -> String {
    "https://www.vcp.cloud/v1".to_string()
}

fn default_partner_id() -> String {
    "4BHY0E1FBCJ5D5BF".to_string()
}

impl Default for VoxxConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            trip_detail_url: None,
            partner_id: default_partner_id(),
        }
    }
}

impl VoxxConfig {
    /// Create a config pointing every endpoint at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Base URL used for trip-detail requests
    pub fn trip_detail_base(&self) -> &str {
        self.trip_detail_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(&self.base_url)
    }
}

/// Local session persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_path")]
    pub path: PathBuf,
}

fn default_session_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("voxx-harness").join("session.json"))
        .unwrap_or_else(|| PathBuf::from("./voxx_session.json"))
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

/// Web harness server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("voxx-harness").join("config.toml")),
            Some(PathBuf::from("./voxx-harness.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Voxx API overrides
        if let Some(url) = var("VOXX_API_URL") {
            self.voxx.base_url = url;
        }
        if let Some(url) = var("VOXX_TRIP_DETAIL_URL") {
            self.voxx.trip_detail_url = Some(url);
        }
        if let Some(partner_id) = var("VOXX_PARTNER_ID") {
            self.voxx.partner_id = partner_id;
        }

        // Session overrides
        if let Some(path) = var("VOXX_SESSION_PATH") {
            self.session.path = PathBuf::from(path);
        }

        // Server overrides
        if let Some(host) = var("VOXX_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("VOXX_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        // Logging overrides
        if let Some(level) = var("VOXX_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("VOXX_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Voxx Harness Configuration
#
# Environment variables override these settings:
# - VOXX_API_URL
# - VOXX_TRIP_DETAIL_URL
# - VOXX_PARTNER_ID
# - VOXX_SESSION_PATH
# - VOXX_HOST
# - VOXX_PORT
# - VOXX_LOG_LEVEL
# - VOXX_LOG_FORMAT

[voxx]
# Base URL for the Voxx API (auth, devices, trips, commands, trip details)
base_url = "https://www.vcp.cloud/v1"

# Optional separate host for trip-detail lookups
# trip_detail_url = "https://www.vcp.cloud/v1"

# Partner identifier sent on login
partner_id = "4BHY0E1FBCJ5D5BF"

[session]
# Where the session token and account id are kept
# path = "~/.local/share/voxx-harness/session.json"

[server]
# Web harness host
host = "127.0.0.1"

# Web harness port
port = 3000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.voxx.base_url, "https://www.vcp.cloud/v1");
        assert_eq!(config.voxx.partner_id, "4BHY0E1FBCJ5D5BF");
        assert_eq!(config.server.addr(), "127.0.0.1:3000");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_trip_detail_base_falls_back_to_base_url() {
        let mut voxx = VoxxConfig::new("http://api.local/v1");
        assert_eq!(voxx.trip_detail_base(), "http://api.local/v1");

        voxx.trip_detail_url = Some(String::new());
        assert_eq!(voxx.trip_detail_base(), "http://api.local/v1");

        voxx.trip_detail_url = Some("http://detail.local/v1".into());
        assert_eq!(voxx.trip_detail_base(), "http://detail.local/v1");
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.voxx.base_url, "https://www.vcp.cloud/v1");
        assert_eq!(config.server.port, 3000);
        assert!(config.voxx.trip_detail_url.is_none());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = Config::parse("[server]\nport = 8088\n").unwrap();
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("VOXX_API_URL", "http://override/v1"),
            ("VOXX_PORT", "9090"),
            ("VOXX_SESSION_PATH", "/tmp/voxx.json"),
            ("VOXX_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.voxx.base_url, "http://override/v1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.session.path, PathBuf::from("/tmp/voxx.json"));
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_invalid_port_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == "VOXX_PORT").then(|| "not-a-port".to_string()));
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/voxx.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
