use bridge_core::{BridgeError, ConfigError, HostError};
use common::ErrorLocation;
use models::{ErrorCode, ModelError};

use std::panic::Location;

use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the `editor-bridge` binary.
///
/// Library errors are flattened to their message here; bridge errors keep their
/// wire code so the exit report can distinguish remote from connectivity failures.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum CliError {
    /// Error from this app (logger, filesystem, arguments)
    #[error("Cli Error: {message} {location}")]
    Cli {
        message: String,
        location: ErrorLocation,
    },

    #[error("Config Error: {message} {location}")]
    Config {
        message: String,
        location: ErrorLocation,
    },

    /// A bridge call failed
    #[error("Bridge Error [{code}]: {message} {location}")]
    Bridge {
        code: ErrorCode,
        message: String,
        location: ErrorLocation,
    },

    /// The host endpoint could not be started
    #[error("Host Error: {message} {location}")]
    Host {
        message: String,
        location: ErrorLocation,
    },

    #[error("Params Error: {message} {location}")]
    Params {
        message: String,
        location: ErrorLocation,
    },
}

impl CliError {
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            CliError::Bridge { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<BridgeError> for CliError {
    #[track_caller]
    fn from(error: BridgeError) -> Self {
        CliError::Bridge {
            code: error.code(),
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConfigError> for CliError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        CliError::Config {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<HostError> for CliError {
    #[track_caller]
    fn from(error: HostError) -> Self {
        CliError::Host {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ModelError> for CliError {
    #[track_caller]
    fn from(error: ModelError) -> Self {
        CliError::Params {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for CliError {
    #[track_caller]
    fn from(error: serde_json::Error) -> Self {
        CliError::Params {
            message: format!("Invalid JSON: {error}"),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
