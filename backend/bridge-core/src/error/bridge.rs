use common::ErrorLocation;
use models::{ErrorCode, RemoteError};

use serde::Serialize;
use thiserror::Error as ThisError;

/// Failure of a bridge operation as seen by the caller.
///
/// Timeouts and backoff stay inside the dispatcher; callers only ever see the
/// final outcome, tagged with the original method and the attempt count.
#[derive(Debug, ThisError, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum BridgeError {
    #[error("Timeout Error: {method} got no response after {attempts} attempts {location}")]
    Timeout {
        method: String,
        attempts: u32,
        location: ErrorLocation,
    },

    #[error("Disconnected Error: {method} rejected, bridge is not connected {location}")]
    Disconnected {
        method: String,
        location: ErrorLocation,
    },

    #[error("Handshake Error: {message} {location}")]
    HandshakeFailed {
        message: String,
        location: ErrorLocation,
    },

    #[error("Remote Error: {method} failed on host: {message} {location}")]
    Remote {
        method: String,
        message: String,
        code: Option<i64>,
        attempts: u32,
        location: ErrorLocation,
    },

    #[error("Batch Error: item {index} ({method}) failed: {source}")]
    Batch {
        method: String,
        index: usize,
        #[source]
        source: Box<BridgeError>,
        location: ErrorLocation,
    },
}

impl BridgeError {
    #[track_caller]
    pub(crate) fn timeout(method: impl Into<String>, attempts: u32) -> Self {
        BridgeError::Timeout {
            method: method.into(),
            attempts,
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub(crate) fn disconnected(method: impl Into<String>) -> Self {
        BridgeError::Disconnected {
            method: method.into(),
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub(crate) fn handshake(message: impl Into<String>) -> Self {
        BridgeError::HandshakeFailed {
            message: message.into(),
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub(crate) fn remote(method: impl Into<String>, error: RemoteError, attempts: u32) -> Self {
        BridgeError::Remote {
            method: method.into(),
            message: error.message,
            code: error.code,
            attempts,
            location: ErrorLocation::caller(),
        }
    }

    #[track_caller]
    pub(crate) fn batch(method: impl Into<String>, index: usize, source: BridgeError) -> Self {
        BridgeError::Batch {
            method: method.into(),
            index,
            source: Box::new(source),
            location: ErrorLocation::caller(),
        }
    }

    /// Wire-level classification. A batch failure reports its failing member's code.
    pub fn code(&self) -> ErrorCode {
        match self {
            BridgeError::Timeout { .. } => ErrorCode::Timeout,
            BridgeError::Disconnected { .. } => ErrorCode::Disconnected,
            BridgeError::HandshakeFailed { .. } => ErrorCode::HandshakeFailed,
            BridgeError::Remote { .. } => ErrorCode::RemoteError,
            BridgeError::Batch { source, .. } => source.code(),
        }
    }

    /// Method the failed call was issued for, if the failure belongs to one call.
    pub fn method(&self) -> Option<&str> {
        match self {
            BridgeError::Timeout { method, .. }
            | BridgeError::Disconnected { method, .. }
            | BridgeError::Remote { method, .. }
            | BridgeError::Batch { method, .. } => Some(method),
            BridgeError::HandshakeFailed { .. } => None,
        }
    }

    /// Number of transmissions made before the call was given up.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            BridgeError::Timeout { attempts, .. } | BridgeError::Remote { attempts, .. } => {
                Some(*attempts)
            }
            BridgeError::Batch { source, .. } => source.attempts(),
            BridgeError::Disconnected { .. } | BridgeError::HandshakeFailed { .. } => None,
        }
    }

    /// True when the failure says nothing about the backend operation itself,
    /// only that the host could not be reached.
    pub fn is_connectivity(&self) -> bool {
        !matches!(self.code(), ErrorCode::RemoteError)
    }
}
