// Unit tests for BridgeConfig loading, saving and validation

use crate::config::BridgeConfig;
use crate::error::config::ConfigError;

use std::fs;
use std::time::Duration;

use tempfile::TempDir;

/// **VALUE**: Verifies a missing config file yields the documented defaults.
///
/// **WHY THIS MATTERS**: First launch has no config; the bridge must still start.
///
/// **BUG THIS CATCHES**: Would catch treating a missing file as an error, or a
/// drifted default.
#[test]
fn given_no_config_file_when_load_then_defaults() {
    // GIVEN: An empty config directory
    let dir = TempDir::new().expect("temp dir");

    // WHEN: Config is loaded
    let config = BridgeConfig::load(dir.path()).expect("defaults");

    // THEN: Documented defaults
    assert_eq!(config, BridgeConfig::default());
    assert_eq!(config.url, "ws://127.0.0.1:19876");
    assert_eq!(config.timeout(), Duration::from_millis(5_000));
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.base_delay(), Duration::from_millis(100));
    assert_eq!(config.max_delay(), Duration::from_millis(5_000));
    assert_eq!(config.health_check_interval(), Duration::from_secs(30));
    assert!(!config.debug);
}

/// **VALUE**: Verifies the front-end's option names are read from disk.
///
/// **WHY THIS MATTERS**: The file is shared with the editor, which spells the
/// options `timeout`, `baseDelay`, `maxDelay`.
///
/// **BUG THIS CATCHES**: Would catch the `_ms` suffix leaking into key names.
#[test]
fn given_partial_camel_case_file_when_load_then_overrides_applied_and_rest_default() {
    // GIVEN: A file setting a few keys
    let dir = TempDir::new().expect("temp dir");
    fs::write(
        dir.path().join("bridge.json"),
        r#"{ "timeout": 750, "maxRetries": 1, "baseDelay": 50, "debug": true }"#,
    )
    .expect("write config");

    // WHEN: Config is loaded
    let config = BridgeConfig::load(dir.path()).expect("valid config");

    // THEN: Given keys applied, others default
    assert_eq!(config.timeout_ms, 750);
    assert_eq!(config.max_retries, 1);
    assert_eq!(config.base_delay_ms, 50);
    assert!(config.debug);
    assert_eq!(config.max_delay_ms, 5_000);
}

/// **VALUE**: Verifies save then load returns the same values and leaves no temp file.
///
/// **BUG THIS CATCHES**: Would catch a failed rename leaving `bridge.json.tmp` behind.
#[test]
fn given_custom_config_when_saved_then_load_returns_it() {
    let dir = TempDir::new().expect("temp dir");
    let config = BridgeConfig {
        url: "wss://editor.local:9000/bridge".to_string(),
        max_retries: 5,
        health_check_interval_ms: 10_000,
        ..Default::default()
    };

    config.save(dir.path()).expect("save");
    let loaded = BridgeConfig::load(dir.path()).expect("load");

    assert_eq!(loaded, config);
    assert!(!dir.path().join("bridge.json.tmp").exists());
}

/// **VALUE**: Verifies a corrupt file is an error, not a silent reset to defaults.
///
/// **WHY THIS MATTERS**: Silently discarding the user's config hides the mistake.
#[test]
fn given_corrupt_file_when_load_then_parse_error() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("bridge.json"), "{ not json").expect("write config");

    let result = BridgeConfig::load(dir.path());

    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

/// **VALUE**: Verifies each validation rule rejects its bad value.
///
/// **BUG THIS CATCHES**: Would catch a rule being dropped, e.g. an `http://` URL
/// being accepted and then failing deep inside the WebSocket handshake.
#[test]
fn given_invalid_values_when_validate_then_validation_error() {
    let cases = [
        BridgeConfig {
            timeout_ms: 0,
            ..Default::default()
        },
        BridgeConfig {
            health_check_interval_ms: 0,
            ..Default::default()
        },
        BridgeConfig {
            base_delay_ms: 6_000,
            ..Default::default()
        },
        BridgeConfig {
            failure_threshold: 0,
            ..Default::default()
        },
        BridgeConfig {
            url: "http://127.0.0.1:19876".to_string(),
            ..Default::default()
        },
        BridgeConfig {
            url: "not a url".to_string(),
            ..Default::default()
        },
    ];

    for config in cases {
        let result = config.validate();
        assert!(
            matches!(result, Err(ConfigError::ValidationError { .. })),
            "expected validation error for {config:?}"
        );
    }
}

/// **VALUE**: Verifies an invalid file on disk is rejected at load time.
#[test]
fn given_invalid_values_on_disk_when_load_then_validation_error() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("bridge.json"), r#"{ "timeout": 0 }"#).expect("write config");

    let result = BridgeConfig::load(dir.path());

    assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
}

/// **VALUE**: Verifies over-large timeouts and intervals are rejected at load time.
///
/// **WHY THIS MATTERS**: Every request timer is derived from these values; a `timeout`
/// near `u64::MAX` milliseconds cannot be scheduled and must never reach the bridge.
///
/// **BUG THIS CATCHES**: Would catch the upper bounds being dropped from `validate`,
/// letting a hand-edited bridge.json through.
#[test]
fn given_over_large_timeouts_on_disk_when_load_then_validation_error() {
    // GIVEN: One file per bounded key, each just past its ceiling
    let files = [
        r#"{ "timeout": 600001 }"#,
        r#"{ "timeout": 18446744073709551615 }"#,
        r#"{ "handshakeTimeoutMs": 600001 }"#,
        r#"{ "pingTimeoutMs": 600001 }"#,
        r#"{ "healthCheckIntervalMs": 86400001 }"#,
    ];

    for contents in files {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("bridge.json"), contents).expect("write config");

        // WHEN: Loading it
        let result = BridgeConfig::load(dir.path());

        // THEN: Validation rejects it
        assert!(
            matches!(result, Err(ConfigError::ValidationError { .. })),
            "expected validation error for {contents}"
        );
    }
}

/// **VALUE**: Verifies values exactly at the ceilings are still accepted.
///
/// **BUG THIS CATCHES**: Would catch an off-by-one turning `>` into `>=`.
#[test]
fn given_timeouts_at_ceiling_when_validate_then_ok() {
    // GIVEN
    let config = BridgeConfig {
        timeout_ms: 600_000,
        handshake_timeout_ms: 600_000,
        ping_timeout_ms: 600_000,
        health_check_interval_ms: 86_400_000,
        ..Default::default()
    };

    // WHEN / THEN
    assert!(config.validate().is_ok());
}
