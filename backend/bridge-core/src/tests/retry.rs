// Unit tests for timeout scaling and the retry backoff schedule

use crate::bridge::retry::{RetryPolicy, attempt_timeout};
use crate::config::BridgeConfig;

use std::time::Duration;

/// **VALUE**: Verifies the per-attempt timeout grows by half the base each attempt.
///
/// **WHY THIS MATTERS**: A slow host gets progressively more time on every retry
/// instead of being hammered with the same short deadline.
///
/// **BUG THIS CATCHES**: Would catch an off-by-one in the attempt index (attempt 1
/// must use exactly the base timeout).
#[test]
fn given_base_timeout_when_attempt_grows_then_deadline_scales_by_half_base() {
    // GIVEN: A 5 second base timeout
    let base = Duration::from_millis(5_000);

    // WHEN/THEN: Each attempt adds 2.5 seconds
    assert_eq!(attempt_timeout(base, 1), Duration::from_millis(5_000));
    assert_eq!(attempt_timeout(base, 2), Duration::from_millis(7_500));
    assert_eq!(attempt_timeout(base, 3), Duration::from_millis(10_000));
    assert_eq!(attempt_timeout(base, 4), Duration::from_millis(12_500));
}

/// **VALUE**: Verifies the documented backoff sequence for the default config.
///
/// **WHY THIS MATTERS**: Retry pacing must be deterministic so behaviour under
/// load can be reasoned about (and tested) without jitter.
///
/// **BUG THIS CATCHES**: Would catch a randomized backoff or a wrong multiplier.
#[test]
fn given_default_config_when_retrying_then_delays_are_100_200_400_800() {
    // GIVEN: baseDelay=100, maxDelay=5000
    let policy = RetryPolicy::from_config(&BridgeConfig::default());
    let mut schedule = policy.schedule();

    // WHEN: Four retries are scheduled
    let delays: Vec<u128> = (0..4).map(|_| schedule.next_delay().as_millis()).collect();

    // THEN: Each delay doubles
    assert_eq!(delays, vec![100, 200, 400, 800]);
}

/// **VALUE**: Verifies the backoff never exceeds maxDelay.
///
/// **WHY THIS MATTERS**: Unbounded exponential growth would leave a request
/// parked for minutes after the host came back.
///
/// **BUG THIS CATCHES**: Would catch a missing cap or a cap applied before doubling.
#[test]
fn given_many_retries_when_delay_would_exceed_max_then_capped_at_max_delay() {
    // GIVEN: The default policy
    let policy = RetryPolicy::from_config(&BridgeConfig::default());
    let mut schedule = policy.schedule();

    // WHEN: Ten retries are scheduled
    let delays: Vec<u128> = (0..10).map(|_| schedule.next_delay().as_millis()).collect();

    // THEN: 3200 is the last doubled value, then it stays at 5000
    assert_eq!(delays[5], 3_200);
    assert!(delays[6..].iter().all(|delay| *delay == 5_000));
}

/// **VALUE**: Verifies every operation gets its own schedule.
///
/// **BUG THIS CATCHES**: Would catch a shared backoff where one request's retries
/// inflate another request's first delay.
#[test]
fn given_two_schedules_when_one_advances_then_other_starts_at_base() {
    let policy = RetryPolicy::from_config(&BridgeConfig::default());
    let mut first = policy.schedule();
    let mut second = policy.schedule();

    first.next_delay();
    first.next_delay();

    assert_eq!(second.next_delay().as_millis(), 100);
}

/// **VALUE**: Verifies deadline scaling saturates instead of overflowing.
///
/// **WHY THIS MATTERS**: The deadline is computed on the bridge actor; a panic there
/// would take every in-flight and future request down with it.
///
/// **BUG THIS CATCHES**: Would catch a plain `Duration * u32` on a huge base timeout.
#[test]
fn given_huge_base_timeout_when_scaled_then_saturates_at_max() {
    // GIVEN / WHEN / THEN
    assert_eq!(attempt_timeout(Duration::MAX, 1), Duration::MAX);
    assert_eq!(attempt_timeout(Duration::MAX, u32::MAX), Duration::MAX);
    assert_eq!(
        attempt_timeout(Duration::from_secs(600), 3),
        Duration::from_secs(1_200)
    );
}
