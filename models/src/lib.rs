//! Domain models for the editor bridge.
//!
//! This crate contains pure data structures exchanged between the bridge and its
//! callers or carried over the wire. Models have no business logic beyond
//! validation; the bridge behaviour lives in `bridge-core`.
//!
//! ## Contents
//!
//! - [`frame`]: wire frames and correlation ids
//! - [`health`]: the connection health snapshot
//! - [`metrics`]: per-method latency/outcome aggregates
//! - [`request`]: request options and batch items
//! - [`error_code`]: caller-visible error classification

pub mod error;
pub mod error_code;
pub mod frame;
pub mod health;
pub mod metrics;
pub mod request;

pub use common::ErrorLocation;
pub use error::model_error::ModelError;
pub use error_code::ErrorCode;
pub use frame::{
    CorrelationId, EventFrame, HANDSHAKE_METHOD, IncomingFrame, OutgoingFrame, PING_METHOD,
    PROTOCOL_VERSION, RemoteError, ResponseFrame,
};
pub use health::HealthStatus;
pub use metrics::MethodMetrics;
pub use request::builder::RequestOptionsBuilder;
pub use request::{BatchItem, MAX_TIMEOUT, RequestOptions};

#[cfg(test)]
mod tests;
