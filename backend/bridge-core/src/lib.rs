//! Resilient request/response bridge between an editor front-end and its host backend.
//!
//! The crate is split the way the traffic flows:
//!
//! - [`bridge`]: the caller-facing [`Bridge`] handle and the actor that owns
//!   pending operations, the priority queue, health, metrics and subscriptions
//! - [`transport`]: the [`Transport`](transport::Transport) seam with a
//!   WebSocket and an in-process channel implementation
//! - [`host`]: the backend side of the wire (WebSocket endpoint + method router)
//! - [`config`]: [`BridgeConfig`] loading, validation and persistence
//! - [`error`]: error enums for every layer

pub mod bridge;
pub mod config;
pub mod error;
pub mod host;
pub mod transport;

#[cfg(test)]
mod tests;

pub use bridge::{Bridge, ConnectionPhase, ListenerId, QueuedRequest, Subscription};
pub use config::BridgeConfig;
pub use error::{BridgeError, ConfigError, CoreError, HostError, TransportError};

pub const BRIDGE_HOSTNAME: &str = "127.0.0.1";
pub const DEFAULT_HOST_PORT: u16 = 19876;
