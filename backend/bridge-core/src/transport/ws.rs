//! WebSocket transport (tokio-tungstenite).
//!
//! Frames travel as JSON text messages. Binary messages are accepted inbound
//! and decoded the same way. Anything that does not decode is logged and
//! dropped: without a correlation id there is nobody to report it to.

use crate::error::config::ConfigError;
use crate::error::transport::TransportError;
use crate::transport::codec;
use crate::transport::{Transport, TransportLink};

use models::{IncomingFrame, OutgoingFrame};

use futures_util::future::BoxFuture;
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

#[derive(Debug, Clone)]
pub struct WsTransport {
    url: Url,
}

impl WsTransport {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    /// Parse `url` and build a transport for it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for anything that is not a `ws://` or `wss://` URL.
    pub fn from_url(url: &str) -> Result<Self, ConfigError> {
        let config = crate::config::BridgeConfig {
            url: url.to_string(),
            ..Default::default()
        };
        Ok(Self::new(config.parsed_url()?))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Transport for WsTransport {
    fn connect(&self) -> BoxFuture<'_, Result<TransportLink, TransportError>> {
        Box::pin(async move {
            let (stream, _response) = connect_async(self.url.as_str()).await?;
            info!("WebSocket connected to {}", self.url);

            let (mut write, mut read) = stream.split();
            let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<OutgoingFrame>();
            let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<IncomingFrame>();

            // Writer: runs until the bridge drops its sender or the socket fails.
            tokio::spawn(async move {
                while let Some(frame) = outbound_rx.recv().await {
                    let text = match codec::encode(&frame) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!("Failed to encode frame for {}: {}", frame.method, e);
                            continue;
                        }
                    };

                    if let Err(e) = write.send(Message::Text(text.into())).await {
                        warn!("WebSocket send failed: {}", e);
                        break;
                    }
                }

                let _ = write.close().await;
                debug!("WebSocket writer stopped");
            });

            // Reader: dropping `inbound_tx` on exit is the close signal.
            tokio::spawn(async move {
                while let Some(message) = read.next().await {
                    let decoded = match message {
                        Ok(Message::Text(text)) => codec::decode::<IncomingFrame>(text.as_str()),
                        Ok(Message::Binary(data)) => codec::decode_bytes::<IncomingFrame>(&data),
                        Ok(Message::Close(_)) => break,
                        Ok(_) => continue,
                        Err(e) => {
                            warn!("WebSocket read failed: {}", e);
                            break;
                        }
                    };

                    match decoded {
                        Ok(frame) => {
                            if inbound_tx.send(frame).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Discarding undecodable frame: {}", e),
                    }
                }

                debug!("WebSocket reader stopped");
            });

            Ok(TransportLink {
                outbound: outbound_tx,
                inbound: inbound_rx,
            })
        })
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}
