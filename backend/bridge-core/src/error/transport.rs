use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error as ThisError;

/// Client-side transport failures (connecting, framing, moving bytes).
#[derive(Debug, ThisError)]
pub enum TransportError {
    #[error("Connect Error: {message} {location}")]
    Connect {
        message: String,
        location: ErrorLocation,
    },

    #[error("Send Error: {message} {location}")]
    Send {
        message: String,
        location: ErrorLocation,
    },

    #[error("Codec Error: {message} {location}")]
    Codec {
        message: String,
        location: ErrorLocation,
    },
}

impl From<serde_json::Error> for TransportError {
    #[track_caller]
    fn from(error: serde_json::Error) -> Self {
        TransportError::Codec {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for TransportError {
    #[track_caller]
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        TransportError::Connect {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
