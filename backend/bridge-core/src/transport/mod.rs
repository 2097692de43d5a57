//! Transport seam between the bridge actor and whatever carries the frames.
//!
//! A transport only knows how to open a [`TransportLink`]: a pair of channels
//! carrying already-decoded frames. Closing the inbound side is how a transport
//! reports that the connection is gone.

pub mod channel;
pub mod codec;
pub mod ws;

use crate::error::transport::TransportError;

use models::{IncomingFrame, OutgoingFrame};

use futures_util::future::BoxFuture;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub use channel::{ChannelTransport, HostLink, HostSide};
pub use ws::WsTransport;

/// One live connection to the host.
#[derive(Debug)]
pub struct TransportLink {
    pub outbound: UnboundedSender<OutgoingFrame>,
    pub inbound: UnboundedReceiver<IncomingFrame>,
}

pub trait Transport: Send + Sync + 'static {
    /// Open a fresh link. Called once by `initialize()` and again on every recovery.
    fn connect(&self) -> BoxFuture<'_, Result<TransportLink, TransportError>>;

    /// Human-readable target, used in log lines.
    fn describe(&self) -> String;
}
