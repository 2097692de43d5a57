//! Backend side of the bridge.
//!
//! A host exposes named methods through a [`MethodRouter`] and serves them either
//! over WebSocket ([`start_host_server`]) or in-process
//! ([`HostSide::serve`](crate::transport::HostSide::serve)).

mod handle;
mod router;
mod server;

pub use handle::HostHandle;
pub use router::{METHOD_NOT_FOUND_CODE, MethodRouter};
pub use server::start_host_server;
