//! Shared primitives for the editor bridge workspace.
//!
//! ## Architecture
//!
//! - **common** (this crate): cross-cutting primitives (error locations)
//! - **models**: Pure data structures exchanged over the bridge
//! - **bridge-core**: The bridge itself (dispatch, queueing, health, events)
//! - **bridge-cli**: Binary wiring everything together
//!
//! Every error enum in the workspace carries an [`ErrorLocation`] so a log line
//! points at the exact call site that produced it.

pub mod error;

pub use error::error_location::ErrorLocation;
