//! Periodic health probing and automatic recovery.
//!
//! Every `healthCheckIntervalMs` the monitor either pings the host (connected)
//! or runs a recovery (disconnected). Crossing the failure threshold wakes it
//! early so recovery does not wait for the next tick.

use crate::bridge::WeakBridge;

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

pub(crate) fn spawn(bridge: WeakBridge, period: Duration, recovery: Arc<Notify>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Health monitor started (every {:?})", period);

        loop {
            let woken = tokio::select! {
                _ = ticker.tick() => false,
                _ = recovery.notified() => true,
            };

            let Some(bridge) = bridge.upgrade() else {
                break;
            };

            let health = bridge.health_status().await;

            if !health.is_connected {
                match bridge.attempt_recovery().await {
                    Ok(()) => info!("Health monitor restored the connection"),
                    Err(e) => warn!("Recovery failed, retrying next interval: {}", e),
                }
            } else if !woken {
                match bridge.ping().await {
                    Ok(_) => debug!("Health probe ok"),
                    Err(e) => warn!("Health probe failed: {}", e),
                }
            }
        }

        debug!("Health monitor stopped");
    })
}
