//! Timeout scaling and retry backoff.
//!
//! Attempt `n` (1-based) waits `base * (1 + 0.5 * (n - 1))` for a response.
//! After a timeout with retries left, the next transmission is delayed by
//! `min(base_delay * 2^(n - 1), max_delay)`.

use crate::config::BridgeConfig;

use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};

/// Response deadline for `attempt` given the call's base timeout.
///
/// Saturates at `Duration::MAX` instead of overflowing.
pub(crate) fn attempt_timeout(base: Duration, attempt: u32) -> Duration {
    // base * (1 + 0.5 * (n - 1)) == base * (n + 1) / 2, kept in integer nanoseconds.
    base.checked_mul(attempt.max(1).saturating_add(1))
        .map_or(Duration::MAX, |scaled| scaled / 2)
}

/// Backoff bounds shared by every operation of one bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self {
            base_delay: config.base_delay(),
            max_delay: config.max_delay(),
        }
    }

    /// Fresh, deterministic schedule for one operation.
    pub fn schedule(&self) -> RetrySchedule {
        let backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.base_delay)
            .with_randomization_factor(0.0)
            .with_multiplier(2.0)
            .with_max_interval(self.max_delay)
            .with_max_elapsed_time(None)
            .build();

        RetrySchedule { backoff }
    }
}

/// Per-operation backoff state.
#[derive(Debug)]
pub(crate) struct RetrySchedule {
    backoff: ExponentialBackoff,
}

impl RetrySchedule {
    /// Delay before the next retransmission.
    pub fn next_delay(&mut self) -> Duration {
        self.backoff
            .next_backoff()
            .unwrap_or(self.backoff.max_interval)
    }
}
