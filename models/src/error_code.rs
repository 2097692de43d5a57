use serde::{Deserialize, Serialize};

use std::fmt::{Display, Formatter, Result as FormatResult};

/// Caller-visible classification of a failed bridge operation.
///
/// Front-end code switches on this to decide between showing the backend's own
/// message ([`ErrorCode::RemoteError`]) and a generic connectivity notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Timeout,
    Disconnected,
    HandshakeFailed,
    RemoteError,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::Disconnected => "DISCONNECTED",
            ErrorCode::HandshakeFailed => "HANDSHAKE_FAILED",
            ErrorCode::RemoteError => "REMOTE_ERROR",
        }
    }
}

impl Display for ErrorCode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        formatter.write_str(self.as_str())
    }
}
