//! Configuration management for Veil.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "VEIL_CONFIG";

/// Main service configuration.
///
/// This is loaded from `$VEIL_CONFIG` if set, otherwise from
/// `~/.config/veil/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Persistence settings
    pub database: DatabaseConfig,
    /// Where broker definitions come from
    pub brokers: BrokerSourceConfig,
    /// Removal dispatch behavior
    pub dispatch: DispatchConfig,
    /// SMTP relay used by the email transport
    pub smtp: SmtpSettings,
    /// Exposure scan providers
    pub scanning: ScanningConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => PathBuf::from(path),
            Err(_) => Self::config_path()?,
        };
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, using defaults if it is absent.
    pub fn load_from(config_path: &Path) -> ConfigResult<Self> {
        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides, then validate.
    ///
    /// Supports the following environment variables:
    /// - `VEIL_BIND_ADDRESS`: Listener address
    /// - `VEIL_DATABASE_URL`: `SQLite` connection URL
    /// - `VEIL_BROKER_DEFINITIONS`: Directory of broker definition TOML files
    /// - `VEIL_TRANSPORT`: `simulated` or `smtp`
    /// - `VEIL_SUCCESS_RATE`: Simulated transport success probability
    /// - `VEIL_HIBP_API_KEY`: Have I Been Pwned API key
    /// - `VEIL_SMTP_PASSWORD`: SMTP relay password
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment).
    ///
    /// Unparseable values are ignored and the configured value is kept.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("VEIL_BIND_ADDRESS") {
            tracing::debug!("Override server.bind_address from env: {}", val);
            self.server.bind_address = val;
        }

        if let Some(val) = lookup("VEIL_DATABASE_URL") {
            tracing::debug!("Override database.url from env");
            self.database.url = val;
        }

        if let Some(val) = lookup("VEIL_BROKER_DEFINITIONS") {
            tracing::debug!("Override brokers.definitions_dir from env: {}", val);
            self.brokers.definitions_dir = Some(PathBuf::from(val));
        }

        if let Some(val) = lookup("VEIL_TRANSPORT") {
            match val.as_str() {
                "simulated" => self.dispatch.transport = TransportKind::Simulated,
                "smtp" => self.dispatch.transport = TransportKind::Smtp,
                other => tracing::warn!("Ignoring unknown VEIL_TRANSPORT value: {}", other),
            }
        }

        if let Some(val) = lookup("VEIL_SUCCESS_RATE") {
            if let Ok(rate) = val.parse() {
                self.dispatch.success_rate = rate;
                tracing::debug!("Override dispatch.success_rate from env: {}", rate);
            }
        }

        if let Some(val) = lookup("VEIL_HIBP_API_KEY") {
            self.scanning.hibp_api_key = Some(val);
        }

        if let Some(val) = lookup("VEIL_SMTP_PASSWORD") {
            self.smtp.password = Some(val);
        }
    }

    /// Check that values are within the ranges the service can operate with.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.dispatch.success_rate) {
            return Err(ConfigError::InvalidValue {
                field: "dispatch.success_rate".to_string(),
                reason: format!("must be between 0 and 1, got {}", self.dispatch.success_rate),
            });
        }

        if self.dispatch.max_concurrent == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dispatch.max_concurrent".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.dispatch.attempt_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dispatch.attempt_timeout_secs".to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }

        if self.dispatch.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dispatch.max_attempts".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.dispatch.backoff_ms.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "dispatch.backoff_ms".to_string(),
                reason: "backoff schedule cannot be empty".to_string(),
            });
        }

        if self.dispatch.transport == TransportKind::Smtp && self.smtp.host.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "smtp.host".to_string(),
                reason: "required when dispatch.transport = \"smtp\"".to_string(),
            });
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.max_connections".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/veil/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "veil", "veil").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind, e.g. `127.0.0.1:8000`
    pub bind_address: String,
    /// Allow cross-origin requests from any origin
    pub cors_allow_any: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
            cors_allow_any: true,
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL (`sqlite::memory:` for an ephemeral store)
    pub url: String,
    /// Maximum pooled connections
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:veil.db".to_string(),
            max_connections: 5,
        }
    }
}

/// Broker definition source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerSourceConfig {
    /// Directory of broker definition TOML files; built-in brokers when unset
    pub definitions_dir: Option<PathBuf>,
}

/// Which delivery mechanism carries removal requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// No real delivery; success decided by `success_rate`
    #[default]
    Simulated,
    /// Email-process brokers are mailed through the configured SMTP relay
    Smtp,
}

/// Removal dispatch behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Delivery mechanism
    pub transport: TransportKind,
    /// Brokers handled concurrently within one submission
    pub max_concurrent: usize,
    /// Upper bound on a single delivery attempt, in seconds
    pub attempt_timeout_secs: u64,
    /// Total attempts per broker, including the first
    pub max_attempts: u32,
    /// Delay before each retry in milliseconds; the last entry repeats
    pub backoff_ms: Vec<u64>,
    /// Probability that a simulated delivery succeeds
    pub success_rate: f64,
    /// Artificial latency of a simulated delivery, in milliseconds
    pub simulated_latency_ms: u64,
}

impl DispatchConfig {
    /// Per-attempt timeout as a `Duration`.
    #[must_use]
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    /// Retry delays as `Duration`s.
    #[must_use]
    pub fn backoff_schedule(&self) -> Vec<Duration> {
        self.backoff_ms
            .iter()
            .copied()
            .map(Duration::from_millis)
            .collect()
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::Simulated,
            max_concurrent: 4,
            attempt_timeout_secs: 30,
            max_attempts: 3,
            backoff_ms: vec![500, 2_000, 5_000],
            success_rate: 0.9,
            simulated_latency_ms: 500,
        }
    }
}

/// SMTP relay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpSettings {
    /// Relay host name
    pub host: String,
    /// Relay port
    pub port: u16,
    /// Relay user name
    pub username: String,
    /// Relay password (from `VEIL_SMTP_PASSWORD`, never written to disk)
    #[serde(skip)]
    pub password: Option<String>,
    /// Sender address for removal requests
    pub from: String,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 587,
            username: String::new(),
            password: None,
            from: "privacy@veil.local".to_string(),
        }
    }
}

/// Exposure scan settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanningConfig {
    /// Have I Been Pwned API base URL
    pub hibp_api_url: String,
    /// Have I Been Pwned API key (from `VEIL_HIBP_API_KEY`, never written to disk);
    /// the static breach fixture is used when absent
    #[serde(skip)]
    pub hibp_api_key: Option<String>,
    /// User agent sent to external providers
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ScanningConfig {
    fn default() -> Self {
        Self {
            hibp_api_url: "https://haveibeenpwned.com/api/v3".to_string(),
            hibp_api_key: None,
            user_agent: "Veil/0.1.0 (+https://github.com/veil-privacy/veil)".to_string(),
            timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind_address, "127.0.0.1:8000");
        assert_eq!(config.dispatch.transport, TransportKind::Simulated);
        assert_eq!(config.dispatch.max_attempts, 3);
        assert!((config.dispatch.success_rate - 0.9).abs() < f64::EPSILON);
        assert!(config.brokers.definitions_dir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[dispatch]"));
        assert!(toml_str.contains("[scanning]"));
        assert!(!toml_str.contains("hibp_api_key"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(parsed.dispatch.backoff_ms, config.dispatch.backoff_ms);
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");

        let mut config = AppConfig::default();
        config.server.bind_address = "0.0.0.0:9000".to_string();
        config.dispatch.max_concurrent = 8;

        let contents = toml::to_string_pretty(&config).expect("serialize config");
        fs::write(&config_path, contents).expect("write config file");

        let loaded = AppConfig::load_from(&config_path).expect("load config");
        assert_eq!(loaded.server.bind_address, "0.0.0.0:9000");
        assert_eq!(loaded.dispatch.max_concurrent, 8);
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let tmp = TempDir::new().expect("create temp dir");
        let loaded =
            AppConfig::load_from(&tmp.path().join("absent.toml")).expect("load defaults");
        assert_eq!(loaded.database.url, "sqlite:veil.db");
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("VEIL_BIND_ADDRESS", "0.0.0.0:8080"),
            ("VEIL_TRANSPORT", "smtp"),
            ("VEIL_SUCCESS_RATE", "0.5"),
            ("VEIL_HIBP_API_KEY", "key-123"),
            ("VEIL_BROKER_DEFINITIONS", "/etc/veil/brokers"),
        ]);

        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.dispatch.transport, TransportKind::Smtp);
        assert!((config.dispatch.success_rate - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.scanning.hibp_api_key.as_deref(), Some("key-123"));
        assert_eq!(
            config.brokers.definitions_dir,
            Some(PathBuf::from("/etc/veil/brokers"))
        );
    }

    #[test]
    fn test_unparseable_override_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| (key == "VEIL_SUCCESS_RATE").then(|| "lots".to_string()));
        assert!((config.dispatch.success_rate - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validation_rejects_out_of_range() {
        let mut config = AppConfig::default();
        config.dispatch.success_rate = 1.5;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.dispatch.max_concurrent = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.dispatch.backoff_ms.clear();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.dispatch.transport = TransportKind::Smtp;
        assert!(config.validate().is_err());
        config.smtp.host = "smtp.example.com".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_attempt_timeout() {
        let mut config = AppConfig::default();
        config.dispatch.attempt_timeout_secs = 0;

        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "dispatch.attempt_timeout_secs");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }

        config.dispatch.attempt_timeout_secs = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[dispatch]
transport = "smtp"
max_attempts = 5

[smtp]
host = "smtp.example.com"
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.dispatch.transport, TransportKind::Smtp);
        assert_eq!(config.dispatch.max_attempts, 5);
        assert_eq!(config.smtp.port, 587);
        // These should be defaults
        assert_eq!(config.dispatch.max_concurrent, 4);
        assert_eq!(config.server.bind_address, "127.0.0.1:8000");
    }

    #[test]
    fn test_backoff_schedule() {
        let config = DispatchConfig::default();
        assert_eq!(
            config.backoff_schedule(),
            vec![
                Duration::from_millis(500),
                Duration::from_secs(2),
                Duration::from_secs(5)
            ]
        );
        assert_eq!(config.attempt_timeout(), Duration::from_secs(30));
    }
}
