//! Bridge configuration.
//!
//! Loaded from `{config_dir}/bridge.json`. Every key is optional; anything
//! missing falls back to the defaults below. Keys use camelCase on disk to
//! match the option names the front-end already uses (`timeout`,
//! `maxRetries`, `baseDelay`, ...).

use crate::error::config::ConfigError;
use crate::{BRIDGE_HOSTNAME, DEFAULT_HOST_PORT};

use common::ErrorLocation;
use models::MAX_TIMEOUT;

use std::panic::Location;
use std::path::Path;
use std::time::Duration;

use const_format::concatcp;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use url::Url;

const CONFIG_FILE_NAME: &str = "bridge.json";

pub const DEFAULT_URL: &str = concatcp!("ws://", BRIDGE_HOSTNAME, ":", DEFAULT_HOST_PORT);
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 100;
pub const DEFAULT_MAX_DELAY_MS: u64 = 5_000;
pub const DEFAULT_HEALTH_CHECK_INTERVAL_MS: u64 = 30_000;
pub const DEFAULT_HANDSHAKE_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_PING_TIMEOUT_MS: u64 = 2_000;
pub const DEFAULT_PING_MAX_RETRIES: u32 = 1;
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
pub const DEFAULT_QUEUE_DRAIN_DELAY_MS: u64 = 10;

/// Ceiling for `timeout`, `handshakeTimeoutMs` and `pingTimeoutMs`.
pub const MAX_TIMEOUT_MS: u64 = MAX_TIMEOUT.as_millis() as u64;

/// Ceiling for `healthCheckIntervalMs` (one day).
pub const MAX_HEALTH_CHECK_INTERVAL_MS: u64 = 86_400_000;

// ============================================
// CONFIG STRUCT
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
    /// WebSocket endpoint of the host backend.
    #[serde(default = "default_url")]
    pub url: String,

    /// Base timeout per request, before per-attempt scaling.
    #[serde(rename = "timeout", default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(rename = "baseDelay", default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(rename = "maxDelay", default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_health_check_interval_ms")]
    pub health_check_interval_ms: u64,

    /// Trace every frame in and out at debug level.
    #[serde(default)]
    pub debug: bool,

    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,

    #[serde(default = "default_ping_timeout_ms")]
    pub ping_timeout_ms: u64,

    #[serde(default = "default_ping_max_retries")]
    pub ping_max_retries: u32,

    /// Consecutive failed attempts after which the connection counts as lost.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Pause between two dispatches from the priority queue.
    #[serde(default = "default_queue_drain_delay_ms")]
    pub queue_drain_delay_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            health_check_interval_ms: DEFAULT_HEALTH_CHECK_INTERVAL_MS,
            debug: false,
            handshake_timeout_ms: DEFAULT_HANDSHAKE_TIMEOUT_MS,
            ping_timeout_ms: DEFAULT_PING_TIMEOUT_MS,
            ping_max_retries: DEFAULT_PING_MAX_RETRIES,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            queue_drain_delay_ms: DEFAULT_QUEUE_DRAIN_DELAY_MS,
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_url() -> String {
    DEFAULT_URL.to_string()
}
fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}
fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}
fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY_MS
}
fn default_max_delay_ms() -> u64 {
    DEFAULT_MAX_DELAY_MS
}
fn default_health_check_interval_ms() -> u64 {
    DEFAULT_HEALTH_CHECK_INTERVAL_MS
}
fn default_handshake_timeout_ms() -> u64 {
    DEFAULT_HANDSHAKE_TIMEOUT_MS
}
fn default_ping_timeout_ms() -> u64 {
    DEFAULT_PING_TIMEOUT_MS
}
fn default_ping_max_retries() -> u32 {
    DEFAULT_PING_MAX_RETRIES
}
fn default_failure_threshold() -> u32 {
    DEFAULT_FAILURE_THRESHOLD
}
fn default_queue_drain_delay_ms() -> u64 {
    DEFAULT_QUEUE_DRAIN_DELAY_MS
}

// ============================================
// IMPLEMENTATION
// ============================================

impl BridgeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn health_check_interval(&self) -> Duration {
        Duration::from_millis(self.health_check_interval_ms)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout_ms)
    }

    pub fn queue_drain_delay(&self) -> Duration {
        Duration::from_millis(self.queue_drain_delay_ms)
    }

    /// Parse and check the host URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if the URL does not parse or is
    /// not a `ws://` / `wss://` URL.
    #[track_caller]
    pub fn parsed_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.url).map_err(|e| ConfigError::ValidationError {
            location: ErrorLocation::from(Location::caller()),
            reason: format!("Invalid url {}: {e}", self.url),
        })?;

        match url.scheme() {
            "ws" | "wss" => Ok(url),
            other => Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("Unsupported url scheme {other} (expected ws or wss)"),
            }),
        }
    }

    /// Load config from {config_dir}/bridge.json.
    ///
    /// # Returns
    ///
    /// Returns `Ok(BridgeConfig)` if loaded successfully or defaults if the file is missing.
    /// Returns `Err(ConfigError)` if the file exists but is corrupted or invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: BridgeConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/bridge.json using temp file + rename.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation, directory creation, serialization,
    /// the write or the rename fails.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{}.tmp", CONFIG_FILE_NAME));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "timeout must be greater than zero".to_string(),
            });
        }

        if self.health_check_interval_ms == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "healthCheckIntervalMs must be greater than zero".to_string(),
            });
        }

        if self.health_check_interval_ms > MAX_HEALTH_CHECK_INTERVAL_MS {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "healthCheckIntervalMs ({}ms) cannot exceed {MAX_HEALTH_CHECK_INTERVAL_MS}ms",
                    self.health_check_interval_ms
                ),
            });
        }

        for (name, value) in [
            ("timeout", self.timeout_ms),
            ("handshakeTimeoutMs", self.handshake_timeout_ms),
            ("pingTimeoutMs", self.ping_timeout_ms),
        ] {
            if value > MAX_TIMEOUT_MS {
                return Err(ConfigError::ValidationError {
                    location: ErrorLocation::from(Location::caller()),
                    reason: format!("{name} ({value}ms) cannot exceed {MAX_TIMEOUT_MS}ms"),
                });
            }
        }

        if self.base_delay_ms > self.max_delay_ms {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "baseDelay ({}ms) cannot exceed maxDelay ({}ms)",
                    self.base_delay_ms, self.max_delay_ms
                ),
            });
        }

        if self.failure_threshold == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "failureThreshold must be at least 1".to_string(),
            });
        }

        if self.handshake_timeout_ms == 0 || self.ping_timeout_ms == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "handshake and ping timeouts must be greater than zero".to_string(),
            });
        }

        self.parsed_url()?;

        Ok(())
    }
}
