//! Host-side WebSocket endpoint.
//!
//! The backend half of the bridge:
//!
//! - Listens on localhost only
//! - Rejects non-loopback peers
//! - Decodes `{correlationId, method, params}` text frames and hands them to a
//!   [`MethodRouter`]
//! - Runs every handler on its own task, so responses go out in completion
//!   order, not request order
//! - Broadcasts push events to every open connection

use crate::BRIDGE_HOSTNAME;
use crate::error::host::HostError;
use crate::host::handle::HostHandle;
use crate::host::router::MethodRouter;
use crate::transport::codec;

use common::ErrorLocation;
use models::{EventFrame, IncomingFrame, OutgoingFrame, ResponseFrame};

use std::net::SocketAddr;
use std::panic::Location;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn as TokioSpawn;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};

const EVENT_BUFFER: usize = 256;

type FrameSink = SplitSink<WebSocketStream<TcpStream>, Message>;

/// Starts the host endpoint on `127.0.0.1:<port>`.
///
/// Port `0` binds a free port; read it back from [`HostHandle::local_addr`].
///
/// # Errors
///
/// Returns [`HostError::Io`] if the port is already in use or cannot be bound.
pub async fn start_host_server(port: u16, router: MethodRouter) -> Result<HostHandle, HostError> {
    let address = format!("{BRIDGE_HOSTNAME}:{port}");
    let listener = TcpListener::bind(&address).await?;
    let local_addr = listener.local_addr()?;

    info!("Host endpoint listening on {}", local_addr);

    let (events_tx, _) = broadcast::channel(EVENT_BUFFER);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let accept_events = events_tx.clone();
    let mut accept_shutdown = shutdown_rx.clone();

    let accept_task = TokioSpawn(async move {
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, addr) = match accepted {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            warn!("Accept failed: {}", e);
                            continue;
                        }
                    };

                    info!("Client connecting from {}", addr);
                    let router = router.clone();
                    let events = accept_events.subscribe();
                    let shutdown = shutdown_rx.clone();

                    TokioSpawn(async move {
                        if let Err(e) = handle_connection(stream, addr, router, events, shutdown).await {
                            error!("Connection {} ended with error: {}", addr, e);
                        }
                    });
                }
                _ = accept_shutdown.changed() => break,
            }
        }
        debug!("Host accept loop stopped");
    });

    Ok(HostHandle {
        local_addr,
        events: events_tx,
        shutdown: shutdown_tx,
        accept_task,
    })
}

/// Serves one WebSocket connection until the client leaves or the endpoint shuts down.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    router: MethodRouter,
    mut events: broadcast::Receiver<EventFrame>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), HostError> {
    if !addr.ip().is_loopback() {
        warn!("Rejected non-loopback connection from {}", addr);
        return Ok(());
    }

    let ws_stream = accept_async(stream).await.map_err(|e| HostError::Handshake {
        message: format!("WebSocket handshake failed: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let (mut write, mut read) = ws_stream.split();
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<ResponseFrame>();

    loop {
        tokio::select! {
            message = read.next() => {
                let frame = match message {
                    Some(Ok(Message::Text(text))) => codec::decode::<OutgoingFrame>(text.as_str()),
                    Some(Ok(Message::Binary(data))) => codec::decode_bytes::<OutgoingFrame>(&data),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        return Err(HostError::Read {
                            message: format!("Error reading message: {e}"),
                            location: ErrorLocation::from(Location::caller()),
                        });
                    }
                };

                let frame = match frame {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!("Client {} sent an undecodable frame: {}", addr, e);
                        continue;
                    }
                };

                let router = router.clone();
                let reply_tx = reply_tx.clone();
                TokioSpawn(async move {
                    let response = router.dispatch(frame).await;
                    let _ = reply_tx.send(response);
                });
            }
            Some(response) = reply_rx.recv() => {
                send_frame(&mut write, &IncomingFrame::Response(response)).await?;
            }
            event = events.recv() => match event {
                Ok(frame) => send_frame(&mut write, &IncomingFrame::Event(frame)).await?,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Client {} missed {} events", addr, skipped);
                }
                Err(RecvError::Closed) => break,
            },
            _ = shutdown.changed() => break,
        }
    }

    let _ = write.close().await;
    info!("Client {} disconnected", addr);
    Ok(())
}

async fn send_frame(write: &mut FrameSink, frame: &IncomingFrame) -> Result<(), HostError> {
    let text = codec::encode(frame)?;

    write
        .send(Message::Text(text.into()))
        .await
        .map_err(|e| HostError::Send {
            message: format!("Failed to send frame: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
}
