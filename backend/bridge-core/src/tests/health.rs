// Unit tests for connection health bookkeeping

use crate::bridge::health::HealthTracker;

fn connected_tracker() -> HealthTracker {
    let mut tracker = HealthTracker::new(3);
    tracker.mark_connected();
    tracker
}

/// **VALUE**: Verifies the connection flips to disconnected on exactly the third
/// consecutive failure.
///
/// **WHY THIS MATTERS**: Flipping early makes the editor flash "disconnected" on a
/// single slow request; flipping late delays recovery.
///
/// **BUG THIS CATCHES**: Would catch `>` instead of `>=` in the threshold check.
#[test]
fn given_connected_when_three_failures_then_flips_on_third() {
    // GIVEN: A connected tracker with threshold 3
    let mut tracker = connected_tracker();

    // WHEN/THEN: Only the third failure crosses the threshold
    assert!(!tracker.record_failure());
    assert!(!tracker.record_failure());
    assert!(tracker.is_connected());
    assert!(tracker.record_failure());
    assert!(!tracker.is_connected());
    assert_eq!(tracker.status().consecutive_failures, 3);
}

/// **VALUE**: Verifies further failures after the flip do not report a new crossing.
///
/// **BUG THIS CATCHES**: Would catch recovery being triggered once per failure
/// instead of once per outage.
#[test]
fn given_already_disconnected_when_more_failures_then_no_new_crossing() {
    let mut tracker = connected_tracker();
    for _ in 0..3 {
        tracker.record_failure();
    }

    assert!(!tracker.record_failure());
    assert_eq!(tracker.status().consecutive_failures, 4);
}

/// **VALUE**: Verifies a success in between resets the failure streak.
///
/// **WHY THIS MATTERS**: Failures must be *consecutive* to indicate a dead link.
#[test]
fn given_two_failures_when_success_then_streak_resets() {
    // GIVEN: Two failures
    let mut tracker = connected_tracker();
    tracker.record_failure();
    tracker.record_failure();

    // WHEN: A success arrives
    tracker.record_success();

    // THEN: Streak is reset and two more failures do not flip the state
    assert_eq!(tracker.status().consecutive_failures, 0);
    assert!(tracker.status().last_response_time.is_some());
    assert!(!tracker.record_failure());
    assert!(!tracker.record_failure());
    assert!(tracker.is_connected());
}

/// **VALUE**: Verifies a remote error proves liveness without counting as success.
///
/// **BUG THIS CATCHES**: Would catch remote errors inflating `successCount` or
/// being counted toward the disconnect threshold.
#[test]
fn given_failures_when_remote_error_then_streak_resets_but_no_success() {
    let mut tracker = connected_tracker();
    tracker.record_failure();
    tracker.record_failure();

    tracker.record_remote_error();

    let status = tracker.status();
    assert_eq!(status.consecutive_failures, 0);
    assert_eq!(status.total_requests, 3);
    assert_eq!(status.success_count, 0);
    assert!(status.last_response_time.is_some());
}

/// **VALUE**: Verifies reconnection clears the streak and reset keeps totals.
#[test]
fn given_disconnected_when_mark_connected_then_connected_with_zero_failures() {
    let mut tracker = connected_tracker();
    for _ in 0..3 {
        tracker.record_failure();
    }

    tracker.mark_connected();
    assert!(tracker.is_connected());
    assert_eq!(tracker.status().consecutive_failures, 0);

    tracker.reset();
    assert!(!tracker.is_connected());
    assert_eq!(tracker.status().total_requests, 3);
}
