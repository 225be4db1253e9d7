//! Application configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::args::CliArgs;
use crate::infrastructure::gateway::{
    Compression, ConnectParams, DEFAULT_GATEWAY_URL, GatewayClientConfig, HEARTBEAT_INTERVAL,
    MAX_RECONNECT_ATTEMPTS, RECONNECT_DELAY_BASE,
};

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log file path. Logs go to stderr when unset.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Event names or opcodes to print. Empty means every known event.
    #[serde(default)]
    pub subscriptions: Vec<String>,

    /// Gateway connection settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Gateway connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway endpoint (`ws://` or `wss://`).
    #[serde(default = "default_url")]
    pub url: String,

    /// User the connection identifies as.
    #[serde(default)]
    pub user_id: Option<String>,

    /// Requested transport compression.
    #[serde(default)]
    pub compress: Compression,

    /// Keep-alive period in milliseconds.
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,

    /// First reconnect delay in milliseconds; doubles per attempt.
    #[serde(default = "default_reconnect_base_delay_ms")]
    pub reconnect_base_delay_ms: u64,

    /// Consecutive reconnect attempts before giving up.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// Log every envelope and dispatch.
    #[serde(default)]
    pub debug: bool,
}

fn default_url() -> String {
    DEFAULT_GATEWAY_URL.to_string()
}

#[allow(clippy::cast_possible_truncation)]
fn default_heartbeat_interval_ms() -> u64 {
    HEARTBEAT_INTERVAL.as_millis() as u64
}

#[allow(clippy::cast_possible_truncation)]
fn default_reconnect_base_delay_ms() -> u64 {
    RECONNECT_DELAY_BASE.as_millis() as u64
}

const fn default_max_reconnect_attempts() -> u32 {
    MAX_RECONNECT_ATTEMPTS
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            user_id: None,
            compress: Compression::default(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            reconnect_base_delay_ms: default_reconnect_base_delay_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            debug: false,
        }
    }
}

impl GatewayConfig {
    /// Connect parameters for this configuration.
    #[must_use]
    pub fn connect_params(&self) -> ConnectParams {
        let params = ConnectParams::new(self.url.clone()).with_compression(self.compress);
        match &self.user_id {
            Some(user_id) => params.with_user_id(user_id.clone()),
            None => params,
        }
    }

    /// Client settings without callbacks.
    #[must_use]
    pub fn client_config(&self) -> GatewayClientConfig {
        GatewayClientConfig::new()
            .with_heartbeat_interval(Duration::from_millis(self.heartbeat_interval_ms))
            .with_reconnect_base_delay(Duration::from_millis(self.reconnect_base_delay_ms))
            .with_max_reconnect_attempts(self.max_reconnect_attempts)
            .with_debug(self.debug)
    }
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: CliArgs) {
        if let Some(log_path) = args.log_path {
            self.log_path = Some(log_path);
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(url) = args.url {
            self.gateway.url = url;
        }
        if let Some(user_id) = args.user_id {
            self.gateway.user_id = Some(user_id);
        }
        if let Some(compress) = args.compress {
            self.gateway.compress = compress;
        }
        if let Some(attempts) = args.max_reconnect_attempts {
            self.gateway.max_reconnect_attempts = attempts;
        }
        if args.debug {
            self.gateway.debug = true;
        }
        if !args.events.is_empty() {
            self.subscriptions = args.events;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_gateway_section() {
        let toml_content = r#"
            log_level = "debug"
            subscriptions = ["message_create", "40"]

            [gateway]
            url = "wss://gateway.example.com/ws"
            user_id = "1234"
            compress = "none"
            max_reconnect_attempts = 3
        "#;

        let config: AppConfig = toml::from_str(toml_content).expect("Failed to parse config");

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.subscriptions, vec!["message_create", "40"]);
        assert_eq!(config.gateway.url, "wss://gateway.example.com/ws");
        assert_eq!(config.gateway.user_id.as_deref(), Some("1234"));
        assert_eq!(config.gateway.compress, Compression::None);
        assert_eq!(config.gateway.max_reconnect_attempts, 3);
        assert_eq!(config.gateway.heartbeat_interval_ms, 30_000);
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.gateway.url, DEFAULT_GATEWAY_URL);
        assert_eq!(config.gateway.compress, Compression::Zlib);
        assert_eq!(config.gateway.reconnect_base_delay_ms, 1000);
        assert_eq!(config.gateway.max_reconnect_attempts, 5);
        assert!(config.subscriptions.is_empty());
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut config = AppConfig::default();
        config.subscriptions = vec!["from_file".to_string()];

        let args = CliArgs::parse_from([
            "gatewire",
            "--url",
            "ws://localhost:9000/gw",
            "--user-id",
            "77",
            "-e",
            "message_create",
            "-e",
            "voice_state_updated",
            "--debug",
        ]);
        config.merge_with_args(args);

        assert_eq!(config.gateway.url, "ws://localhost:9000/gw");
        assert_eq!(config.gateway.user_id.as_deref(), Some("77"));
        assert!(config.gateway.debug);
        assert_eq!(
            config.subscriptions,
            vec!["message_create", "voice_state_updated"]
        );
    }

    #[test]
    fn test_client_config_from_gateway_section() {
        let gateway = GatewayConfig {
            heartbeat_interval_ms: 5_000,
            reconnect_base_delay_ms: 250,
            max_reconnect_attempts: 2,
            ..GatewayConfig::default()
        };

        let client = gateway.client_config();

        assert_eq!(client.heartbeat_interval, Duration::from_secs(5));
        assert_eq!(client.reconnect_base_delay, Duration::from_millis(250));
        assert_eq!(client.max_reconnect_attempts, 2);
    }

    #[test]
    fn test_connect_params_carry_user() {
        let gateway = GatewayConfig {
            user_id: Some("1234".to_string()),
            ..GatewayConfig::default()
        };

        let url = gateway.connect_params().to_url().unwrap();
        assert!(url.contains("user_id=1234"));
        assert!(url.contains("compress=zlib"));
    }
}
