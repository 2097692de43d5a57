//! In-process transport.
//!
//! [`ChannelTransport::pair`] hands back the bridge-side transport and a
//! [`HostSide`] that receives one [`HostLink`] per `connect()`. Hosts that
//! already own a message pipe (or tests) drive the host end directly;
//! [`HostSide::serve`] answers every link through a [`MethodRouter`].

use crate::error::transport::TransportError;
use crate::host::MethodRouter;
use crate::transport::{Transport, TransportLink};

use common::ErrorLocation;
use models::{
    CorrelationId, EventFrame, HANDSHAKE_METHOD, IncomingFrame, OutgoingFrame, PROTOCOL_VERSION,
    RemoteError, ResponseFrame,
};

use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use futures_util::future::BoxFuture;
use log::{debug, info};
use serde_json::{Value, json};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct ChannelTransport {
    offers: UnboundedSender<HostLink>,
    reachable: Arc<AtomicBool>,
    connects: Arc<AtomicUsize>,
}

/// Host end of a [`ChannelTransport`].
#[derive(Debug)]
pub struct HostSide {
    offers: UnboundedReceiver<HostLink>,
    reachable: Arc<AtomicBool>,
    connects: Arc<AtomicUsize>,
}

/// Host end of one connection. Dropping it closes the connection.
#[derive(Debug)]
pub struct HostLink {
    requests: UnboundedReceiver<OutgoingFrame>,
    replies: UnboundedSender<IncomingFrame>,
}

impl ChannelTransport {
    pub fn pair() -> (ChannelTransport, HostSide) {
        let (offers_tx, offers_rx) = mpsc::unbounded_channel();
        let reachable = Arc::new(AtomicBool::new(true));
        let connects = Arc::new(AtomicUsize::new(0));

        (
            ChannelTransport {
                offers: offers_tx,
                reachable: Arc::clone(&reachable),
                connects: Arc::clone(&connects),
            },
            HostSide {
                offers: offers_rx,
                reachable,
                connects,
            },
        )
    }
}

impl Transport for ChannelTransport {
    fn connect(&self) -> BoxFuture<'_, Result<TransportLink, TransportError>> {
        Box::pin(async move {
            self.connects.fetch_add(1, Ordering::SeqCst);

            if !self.reachable.load(Ordering::SeqCst) {
                return Err(TransportError::Connect {
                    message: "Host is not accepting connections".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }

            let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
            let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

            let host_link = HostLink {
                requests: outbound_rx,
                replies: inbound_tx,
            };

            self.offers
                .send(host_link)
                .map_err(|_| TransportError::Connect {
                    message: "Host side has been dropped".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            Ok(TransportLink {
                outbound: outbound_tx,
                inbound: inbound_rx,
            })
        })
    }

    fn describe(&self) -> String {
        "in-process channel".to_string()
    }
}

impl HostSide {
    /// Wait for the bridge's next `connect()`.
    pub async fn accept(&mut self) -> Option<HostLink> {
        self.offers.recv().await
    }

    /// When `false`, `connect()` fails as if the host were down.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Number of `connect()` calls seen so far, refused ones included.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Answer every current and future link through `router`.
    pub fn serve(mut self, router: MethodRouter) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(link) = self.offers.recv().await {
                info!("In-process host accepted a connection");
                tokio::spawn(link.serve(router.clone()));
            }
        })
    }
}

impl HostLink {
    pub async fn next_request(&mut self) -> Option<OutgoingFrame> {
        self.requests.recv().await
    }

    /// Read the handshake request and answer it with the current protocol version.
    ///
    /// Returns the handshake frame, or `None` if the first request was something
    /// else or the bridge went away.
    pub async fn complete_handshake(&mut self) -> Option<OutgoingFrame> {
        let frame = self.next_request().await?;
        if frame.method != HANDSHAKE_METHOD {
            return None;
        }
        self.respond(
            frame.correlation_id,
            json!({ "protocolVersion": PROTOCOL_VERSION }),
        );
        Some(frame)
    }

    pub fn respond(&self, correlation_id: CorrelationId, result: Value) -> bool {
        self.send(IncomingFrame::Response(ResponseFrame::success(
            correlation_id,
            result,
        )))
    }

    pub fn fail(&self, correlation_id: CorrelationId, error: RemoteError) -> bool {
        self.send(IncomingFrame::Response(ResponseFrame::failure(
            correlation_id,
            error,
        )))
    }

    pub fn emit(&self, event: impl Into<String>, payload: Value) -> bool {
        self.send(IncomingFrame::Event(EventFrame {
            event: event.into(),
            payload,
        }))
    }

    /// Returns `false` once the bridge has dropped the link.
    pub fn send(&self, frame: IncomingFrame) -> bool {
        self.replies.send(frame).is_ok()
    }

    /// Sender for answering from other tasks.
    pub fn replies(&self) -> UnboundedSender<IncomingFrame> {
        self.replies.clone()
    }

    async fn serve(mut self, router: MethodRouter) {
        while let Some(frame) = self.requests.recv().await {
            let router = router.clone();
            let replies = self.replies.clone();
            tokio::spawn(async move {
                let response = router.dispatch(frame).await;
                let _ = replies.send(IncomingFrame::Response(response));
            });
        }
        debug!("In-process host link closed");
    }
}
