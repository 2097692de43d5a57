//! Messages understood by the bridge actor.

use crate::bridge::events::{Listener, ListenerId};
use crate::error::bridge::BridgeError;
use crate::transport::TransportLink;

use models::{CorrelationId, HealthStatus, IncomingFrame, MethodMetrics};

use std::fmt::{Debug, Formatter, Result as FormatResult};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub(crate) type Outcome = Result<Value, BridgeError>;

/// What a transmission is for. Decides how it is accounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SendKind {
    /// Caller request: counted in health and metrics.
    Request,
    /// Health probe: counted in health only.
    Probe,
    /// Connection handshake: not counted.
    Handshake,
}

/// Where the bridge stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    /// Never initialized, or torn down by `disconnect()`.
    Uninitialized,
    Connected,
    /// Initialized, but the failure threshold was crossed or the link dropped.
    Degraded,
}

#[derive(Debug)]
pub(crate) struct SendRequest {
    pub method: String,
    pub params: Value,
    pub timeout: Duration,
    pub max_retries: u32,
    pub kind: SendKind,
    pub reply: oneshot::Sender<Outcome>,
}

pub(crate) enum BridgeCommand {
    /// Dispatch immediately.
    Send(SendRequest),
    Enqueue {
        priority: i32,
        request: SendRequest,
    },
    DrainNext,
    Inbound(IncomingFrame),
    LinkClosed {
        generation: u64,
    },
    AttemptTimedOut {
        id: CorrelationId,
        attempt: u32,
    },
    Retransmit {
        id: CorrelationId,
        attempt: u32,
    },
    Attach(TransportLink),
    Detach,
    MarkConnected {
        monitor: Option<JoinHandle<()>>,
    },
    Subscribe {
        id: ListenerId,
        event: String,
        listener: Listener,
    },
    Unsubscribe(ListenerId),
    Metrics {
        method: Option<String>,
        reply: oneshot::Sender<MethodMetrics>,
    },
    Health(oneshot::Sender<HealthStatus>),
    Phase(oneshot::Sender<ConnectionPhase>),
    Disconnect(oneshot::Sender<()>),
}

impl Debug for BridgeCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        match self {
            BridgeCommand::Send(request) => write!(f, "Send({})", request.method),
            BridgeCommand::Enqueue { priority, request } => {
                write!(f, "Enqueue({}, priority {})", request.method, priority)
            }
            BridgeCommand::DrainNext => f.write_str("DrainNext"),
            BridgeCommand::Inbound(_) => f.write_str("Inbound"),
            BridgeCommand::LinkClosed { generation } => write!(f, "LinkClosed({generation})"),
            BridgeCommand::AttemptTimedOut { id, attempt } => {
                write!(f, "AttemptTimedOut({id}, {attempt})")
            }
            BridgeCommand::Retransmit { id, attempt } => write!(f, "Retransmit({id}, {attempt})"),
            BridgeCommand::Attach(_) => f.write_str("Attach"),
            BridgeCommand::Detach => f.write_str("Detach"),
            BridgeCommand::MarkConnected { .. } => f.write_str("MarkConnected"),
            BridgeCommand::Subscribe { id, event, .. } => write!(f, "Subscribe({id:?}, {event})"),
            BridgeCommand::Unsubscribe(id) => write!(f, "Unsubscribe({id:?})"),
            BridgeCommand::Metrics { method, .. } => write!(f, "Metrics({method:?})"),
            BridgeCommand::Health(_) => f.write_str("Health"),
            BridgeCommand::Phase(_) => f.write_str("Phase"),
            BridgeCommand::Disconnect(_) => f.write_str("Disconnect"),
        }
    }
}
