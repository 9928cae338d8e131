//! Configuration schema definitions.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Webhook listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Platform credentials and REST settings.
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

// =============================================================================
// Server
// =============================================================================

/// Webhook listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind to.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Path receiving interaction POSTs.
    #[serde(default = "default_path")]
    pub path: String,

    /// Maximum accepted age of a signed request in seconds; `0` disables
    /// the freshness check.
    #[serde(default = "default_replay_window")]
    pub replay_window_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            path: default_path(),
            replay_window_secs: default_replay_window(),
        }
    }
}

impl ServerConfig {
    /// Returns the freshness window as a duration.
    pub fn replay_window(&self) -> Option<Duration> {
        (self.replay_window_secs > 0).then(|| Duration::from_secs(self.replay_window_secs))
    }
}

fn default_bind() -> String {
    "0.0.0.0:8787".to_string()
}

fn default_path() -> String {
    "/".to_string()
}

fn default_replay_window() -> u64 {
    300
}

fn snowflake<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Snowflake {
        Text(String),
        Number(u64),
    }

    Ok(match Snowflake::deserialize(deserializer)? {
        Snowflake::Text(s) => s,
        Snowflake::Number(n) => n.to_string(),
    })
}

// =============================================================================
// Discord
// =============================================================================

/// Platform credentials and REST client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Hex-encoded Ed25519 public key of the application.
    #[serde(default)]
    pub public_key: String,

    /// Application (client) id.
    ///
    /// Snowflakes arrive as integers from environment variables and unquoted
    /// file values; both forms are accepted.
    #[serde(default, deserialize_with = "snowflake")]
    pub application_id: String,

    /// Bot token used for REST calls.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// REST API base URL, without trailing slash.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// REST request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            public_key: String::new(),
            application_id: String::new(),
            bot_token: None,
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl DiscordConfig {
    /// Returns the REST timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the level as a filter directive fragment.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to the `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature.
    #[cfg(feature = "json-log")]
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base level.
    #[serde(default)]
    pub level: LogLevel,

    /// Line format.
    #[serde(default)]
    pub format: LogFormat,

    /// Destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Log file, used when `output` is `file`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Per-target overrides, e.g. `parley_framework = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,

    /// Include thread ids.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line.
    #[serde(default)]
    pub file_location: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_application_id_accepts_integer_and_string() {
        let numeric: DiscordConfig =
            serde_json::from_value(json!({ "application_id": 1234567890123456789u64 })).unwrap();
        assert_eq!(numeric.application_id, "1234567890123456789");

        let quoted: DiscordConfig =
            serde_json::from_value(json!({ "application_id": "0042" })).unwrap();
        assert_eq!(quoted.application_id, "0042");

        let absent: DiscordConfig = serde_json::from_value(json!({})).unwrap();
        assert!(absent.application_id.is_empty());
    }
}
