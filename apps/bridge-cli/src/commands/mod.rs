//! Subcommand implementations.
//!
//! Each takes its shutdown trigger as a future so tests can stop a long-running
//! command without sending a signal to the process.

pub mod call;
pub mod serve;
pub mod watch;

pub use call::{CallArgs, CallReport, call};
pub use serve::{HEARTBEAT_EVENT, demo_router, serve};
pub use watch::watch;

use log::warn;

/// Resolves on Ctrl-C.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C, stopping: {e}");
    }
}
