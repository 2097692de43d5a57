// Unit tests for the metrics collector

use crate::bridge::metrics::MetricsCollector;

use std::time::Duration;

/// **VALUE**: Verifies the incremental mean matches the arithmetic mean.
///
/// **WHY THIS MATTERS**: Only a running average is stored; if the update formula
/// is wrong there is no sample history to recompute it from.
///
/// **BUG THIS CATCHES**: Would catch dividing by the old count instead of the new one.
#[test]
fn given_latencies_100_200_300_when_recorded_then_average_is_200() {
    // GIVEN: An empty collector
    let mut metrics = MetricsCollector::default();

    // WHEN: Three samples are recorded for one method
    for ms in [100, 200, 300] {
        metrics.record("getFields", Duration::from_millis(ms), true);
    }

    // THEN: Mean 200 over 3 requests
    let snapshot = metrics.snapshot(Some("getFields"));
    assert_eq!(snapshot.total_requests, 3);
    assert_eq!(snapshot.success_count, 3);
    assert!((snapshot.average_latency - 200.0).abs() < 1e-9);
}

/// **VALUE**: Verifies the global aggregate spans all methods while per-method
/// aggregates stay separate.
#[test]
fn given_two_methods_when_snapshot_then_global_and_per_method_differ() {
    let mut metrics = MetricsCollector::default();
    metrics.record("a", Duration::from_millis(10), true);
    metrics.record("b", Duration::from_millis(30), false);

    let global = metrics.snapshot(None);
    let only_b = metrics.snapshot(Some("b"));

    assert_eq!(global.total_requests, 2);
    assert_eq!(global.success_count, 1);
    assert!((global.average_latency - 20.0).abs() < 1e-9);
    assert_eq!(only_b.total_requests, 1);
    assert_eq!(only_b.failure_count(), 1);
}

/// **VALUE**: Verifies an unseen method yields zeroed metrics, not an error.
///
/// **BUG THIS CATCHES**: Would catch creating an entry on read, which would make
/// unseen methods show up in later listings.
#[test]
fn given_unseen_method_when_snapshot_then_zeroed_default() {
    let metrics = MetricsCollector::default();

    let snapshot = metrics.snapshot(Some("neverCalled"));

    assert_eq!(snapshot.total_requests, 0);
    assert_eq!(snapshot.success_count, 0);
    assert_eq!(snapshot.average_latency, 0.0);
}
