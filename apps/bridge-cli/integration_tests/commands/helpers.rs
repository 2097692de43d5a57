//! Shared setup for command tests.

use bridge_cli::commands::{CallArgs, demo_router};

use bridge_core::transport::{ChannelTransport, HostSide};
use bridge_core::{Bridge, BridgeConfig};

pub fn test_config() -> BridgeConfig {
    BridgeConfig {
        timeout_ms: 1_000,
        max_retries: 1,
        health_check_interval_ms: 3_600_000,
        ..Default::default()
    }
}

/// Bridge whose host side answers with the demo router.
pub fn served_bridge() -> Bridge {
    let (transport, host) = ChannelTransport::pair();
    host.serve(demo_router());
    Bridge::new(test_config(), transport).expect("valid config")
}

/// Bridge plus the untouched host side, for tests that drive the host by hand.
pub fn manual_bridge() -> (Bridge, HostSide) {
    let (transport, host) = ChannelTransport::pair();
    let bridge = Bridge::new(test_config(), transport).expect("valid config");
    (bridge, host)
}

pub fn call_args(method: &str, params: Option<&str>) -> CallArgs {
    CallArgs {
        method: method.to_string(),
        params: params.map(str::to_string),
        priority: None,
        timeout_ms: None,
    }
}

/// A loopback port that was free a moment ago.
pub fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .map(|addr| addr.port())
        .expect("should find a free port")
}
