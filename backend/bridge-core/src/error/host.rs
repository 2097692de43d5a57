use common::ErrorLocation;

use std::io::Error as IoError;
use std::panic::Location;

use thiserror::Error as ThisError;

/// Failures of the host endpoint (the backend side of the bridge).
#[derive(Debug, ThisError)]
pub enum HostError {
    #[error("Handshake Error: {message} {location}")]
    Handshake {
        message: String,
        location: ErrorLocation,
    },

    #[error("Send Error: {message} {location}")]
    Send {
        message: String,
        location: ErrorLocation,
    },

    #[error("Read Error: {message} {location}")]
    Read {
        message: String,
        location: ErrorLocation,
    },

    #[error("IO Error: {message} {location}")]
    Io {
        message: String,
        location: ErrorLocation,
    },

    #[error("Codec Error: {message} {location}")]
    Codec {
        message: String,
        location: ErrorLocation,
    },
}

impl From<IoError> for HostError {
    #[track_caller]
    fn from(error: IoError) -> Self {
        HostError::Io {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for HostError {
    #[track_caller]
    fn from(error: serde_json::Error) -> Self {
        HostError::Codec {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
