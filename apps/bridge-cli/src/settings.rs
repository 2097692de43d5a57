//! Effective configuration for a CLI run.
//!
//! Precedence, lowest first: built-in defaults, `config.json` in the config
//! directory, environment (`.env` is loaded by `main` beforehand), then flags.

use crate::cli::Cli;
use crate::error::CliError;

use bridge_core::BridgeConfig;
use common::ErrorLocation;

use std::env;
use std::path::{Path, PathBuf};

use log::debug;

pub const APP_DIR_NAME: &str = "editor-bridge";
pub const URL_ENV: &str = "EDITOR_BRIDGE_URL";
pub const DEBUG_ENV: &str = "EDITOR_BRIDGE_DEBUG";

const LOG_DIR_NAME: &str = "logs";

#[track_caller]
pub fn config_dir(explicit: Option<&Path>) -> Result<PathBuf, CliError> {
    match explicit {
        Some(dir) => Ok(dir.to_path_buf()),
        None => dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or_else(|| CliError::Config {
                message: "No platform config directory; pass --config".to_string(),
                location: ErrorLocation::caller(),
            }),
    }
}

/// Log directory: the explicit one, else the platform data dir, else the temp dir.
pub fn log_dir(explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(dir) => dir.to_path_buf(),
        None => dirs::data_local_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(LOG_DIR_NAME))
            .unwrap_or_else(|| env::temp_dir().join(APP_DIR_NAME)),
    }
}

pub fn resolve(cli: &Cli) -> Result<BridgeConfig, CliError> {
    let dir = config_dir(cli.config.as_deref())?;
    let mut config = BridgeConfig::load(&dir)?;

    apply_env(&mut config)?;

    if let Some(url) = &cli.url {
        config.url = url.clone();
    }
    if cli.debug {
        config.debug = true;
    }

    config.validate()?;
    debug!("Resolved bridge config from {}", dir.display());
    Ok(config)
}

pub fn apply_env(config: &mut BridgeConfig) -> Result<(), CliError> {
    if let Ok(url) = env::var(URL_ENV) {
        config.url = url;
    }
    if let Ok(raw) = env::var(DEBUG_ENV) {
        config.debug = parse_flag(DEBUG_ENV, &raw)?;
    }
    Ok(())
}

#[track_caller]
fn parse_flag(name: &str, raw: &str) -> Result<bool, CliError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(CliError::Config {
            message: format!("{name} must be a boolean, got '{other}'"),
            location: ErrorLocation::caller(),
        }),
    }
}
