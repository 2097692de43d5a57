//! Wire frames exchanged between the bridge and the host backend.
//!
//! Every outgoing message is a request carrying a [`CorrelationId`]. Incoming
//! messages are either a response (they carry `correlationId`) or an
//! unsolicited push (they carry `event`). The two shapes are told apart purely
//! by which of those members is present.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use std::fmt::{Display, Formatter, Result as FormatResult};

/// Reserved method answered by the host to complete the connection handshake.
pub const HANDSHAKE_METHOD: &str = "bridge.handshake";

/// Reserved no-op method used by the health monitor as a liveness probe.
pub const PING_METHOD: &str = "bridge.ping";

/// Protocol version reported by the host in its handshake reply.
pub const PROTOCOL_VERSION: u32 = 1;

/// Opaque token linking a request to its eventual response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for CorrelationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Display for CorrelationId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        Display::fmt(&self.0, formatter)
    }
}

/// `{correlationId, method, params}` sent to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingFrame {
    pub correlation_id: CorrelationId,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// Failure reported by the host for one correlated request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }
}

/// `{correlationId, result}` or `{correlationId, error}` received from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseFrame {
    pub correlation_id: CorrelationId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RemoteError>,
}

impl ResponseFrame {
    pub fn success(correlation_id: CorrelationId, result: Value) -> Self {
        Self {
            correlation_id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(correlation_id: CorrelationId, error: RemoteError) -> Self {
        Self {
            correlation_id,
            result: None,
            error: Some(error),
        }
    }

    /// Splits the frame into its outcome. An error member wins over a result;
    /// a frame with neither resolves to `null`.
    pub fn into_outcome(self) -> Result<Value, RemoteError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// `{event, payload}` pushed by the host without a matching request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFrame {
    pub event: String,
    #[serde(default)]
    pub payload: Value,
}

/// Anything the host can send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IncomingFrame {
    Response(ResponseFrame),
    Event(EventFrame),
}
