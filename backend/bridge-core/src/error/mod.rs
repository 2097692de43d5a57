pub mod bridge;
pub mod config;
pub mod host;
pub mod transport;

pub use bridge::BridgeError;
pub use config::ConfigError;
pub use host::HostError;
pub use transport::TransportError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
