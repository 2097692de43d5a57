//! Handle to a running host endpoint.

use models::EventFrame;

use std::net::SocketAddr;

use log::{debug, info};
use serde_json::Value;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

/// Returned by [`start_host_server`](crate::host::start_host_server).
///
/// Dropping the handle does not stop the server; call [`HostHandle::shutdown`].
#[derive(Debug)]
pub struct HostHandle {
    pub(crate) local_addr: SocketAddr,
    pub(crate) events: broadcast::Sender<EventFrame>,
    pub(crate) shutdown: watch::Sender<bool>,
    pub(crate) accept_task: JoinHandle<()>,
}

impl HostHandle {
    /// Address actually bound (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// `ws://` URL clients should connect to.
    pub fn url(&self) -> String {
        format!("ws://{}", self.local_addr)
    }

    /// Push `{event, payload}` to every connected client.
    ///
    /// Returns the number of connections the event was queued for.
    pub fn emit(&self, event: impl Into<String>, payload: Value) -> usize {
        let frame = EventFrame {
            event: event.into(),
            payload,
        };
        match self.events.send(frame) {
            Ok(receivers) => receivers,
            Err(e) => {
                debug!("No connected clients for event {}", e.0.event);
                0
            }
        }
    }

    /// Stop accepting connections and close the open ones.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.accept_task.await;
        info!("Host endpoint on {} stopped", self.local_addr);
    }
}
