//! Configuration loading for pair-relay.
//!
//! Configuration is loaded from a TOML file (default: `relay.toml`). Every
//! field has a default so an empty or missing file yields a working server.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration for pair-relay.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Mailbox configuration.
    #[serde(default)]
    pub mailbox: MailboxConfig,
    /// Idle sweep configuration.
    #[serde(default)]
    pub sweep: SweepConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP server (default: 0.0.0.0:8091).
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

/// Mailbox configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MailboxConfig {
    /// How long a receive long-poll is held open, in seconds (default: 30).
    ///
    /// This is a server-side constant, not caller-configurable, so stalled
    /// waiters hold memory for a bounded time.
    #[serde(default = "default_await_timeout")]
    pub await_timeout_secs: u64,
    /// Maximum accepted payload size in bytes (default: 256 KiB).
    #[serde(default = "default_max_payload")]
    pub max_payload_bytes: usize,
}

/// Idle sweep configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    /// Sweep interval in seconds (default: 600).
    #[serde(default = "default_sweep_interval")]
    pub interval_secs: u64,
    /// Evict a mailbox once it has been idle this long, in seconds
    /// (default: 600).
    #[serde(default = "default_idle_threshold")]
    pub idle_secs: u64,
    /// Enable the sweep task (default: true).
    #[serde(default = "default_sweep_enabled")]
    pub enabled: bool,
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0:8091".to_string()
}

fn default_await_timeout() -> u64 {
    30
}

fn default_max_payload() -> usize {
    256 * 1024
}

fn default_sweep_interval() -> u64 {
    600 // 10 minutes
}

fn default_idle_threshold() -> u64 {
    600 // 10 minutes
}

fn default_sweep_enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            await_timeout_secs: default_await_timeout(),
            max_payload_bytes: default_max_payload(),
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_sweep_interval(),
            idle_secs: default_idle_threshold(),
            enabled: default_sweep_enabled(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            mailbox: MailboxConfig::default(),
            sweep: SweepConfig::default(),
        }
    }
}

impl MailboxConfig {
    /// The await timeout as a [`Duration`].
    pub fn await_timeout(&self) -> Duration {
        Duration::from_secs(self.await_timeout_secs)
    }
}

impl SweepConfig {
    /// The idle threshold as a [`Duration`].
    pub fn idle_threshold(&self) -> Duration {
        Duration::from_secs(self.idle_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist.
    ///
    /// A present-but-broken file is still an error; only absence is forgiven.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::info!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.server.bind_address, "0.0.0.0:8091");
        assert_eq!(config.mailbox.await_timeout_secs, 30);
        assert_eq!(config.mailbox.max_payload_bytes, 256 * 1024);
        assert_eq!(config.sweep.interval_secs, 600);
        assert!(config.sweep.enabled);
    }

    #[test]
    fn config_from_toml_string() {
        let toml = r#"
[server]
bind_address = "127.0.0.1:9000"

[mailbox]
await_timeout_secs = 5
max_payload_bytes = 1024

[sweep]
interval_secs = 60
idle_secs = 120
enabled = false
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:9000");
        assert_eq!(config.mailbox.await_timeout_secs, 5);
        assert_eq!(config.mailbox.max_payload_bytes, 1024);
        assert_eq!(config.sweep.interval_secs, 60);
        assert_eq!(config.sweep.idle_secs, 120);
        assert!(!config.sweep.enabled);
    }

    #[test]
    fn config_missing_fields_use_defaults() {
        let toml = r#"
[server]
[mailbox]
[sweep]
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.mailbox.await_timeout_secs, 30);
        assert_eq!(config.sweep.idle_secs, 600);
    }

    #[test]
    fn config_missing_sections_use_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:8091");
        assert_eq!(config.mailbox.max_payload_bytes, 256 * 1024);
    }

    #[test]
    fn duration_helpers() {
        let config = Config::default();
        assert_eq!(config.mailbox.await_timeout(), Duration::from_secs(30));
        assert_eq!(config.sweep.idle_threshold(), Duration::from_secs(600));
    }

    #[test]
    fn load_missing_file_falls_back_to_defaults() {
        let config = Config::load(Path::new("/nonexistent/relay.toml")).unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:8091");
    }
}
