use crate::error::CliError;

use bridge_core::{BridgeConfig, ConfigError};
use models::{ErrorCode, RequestOptions};

use std::time::Duration;

/// **VALUE**: Verifies that configuration errors keep their detail when lifted into CliError.
///
/// **WHY THIS MATTERS**: The exit report is the only thing a user sees when the config
/// file is wrong; it must say what is wrong.
///
/// **BUG THIS CATCHES**: Would catch a From impl that drops the underlying message.
#[test]
fn given_invalid_config_when_converted_then_config_variant_keeps_reason() {
    // GIVEN: A config with a non-WebSocket URL
    let config = BridgeConfig {
        url: "http://127.0.0.1:1".to_string(),
        ..BridgeConfig::default()
    };
    let config_error: ConfigError = config.validate().unwrap_err();

    // WHEN: Converting to CliError
    let error = CliError::from(config_error);

    // THEN: The Config variant carries the reason and no bridge code
    assert!(matches!(error, CliError::Config { .. }));
    assert!(error.to_string().starts_with("Config Error:"));
    assert!(
        error.to_string().contains("Unsupported url scheme http"),
        "got: {error}"
    );
    assert_eq!(error.code(), None);
}

/// **VALUE**: Verifies that invalid request options become a Params error.
///
/// **WHY THIS MATTERS**: `--timeout 0` is a usage mistake and should read as one, not
/// as a bridge failure.
///
/// **BUG THIS CATCHES**: Would catch ModelError being routed to the wrong variant.
#[test]
fn given_zero_timeout_option_when_converted_then_params_variant() {
    // GIVEN: A builder with a zero timeout
    let model_error = RequestOptions::builder()
        .with_timeout(Duration::ZERO)
        .build()
        .unwrap_err();

    // WHEN: Converting to CliError
    let error = CliError::from(model_error);

    // THEN: It is a Params error
    assert!(matches!(error, CliError::Params { .. }));
}

/// **VALUE**: Verifies that malformed JSON params produce a readable error.
///
/// **WHY THIS MATTERS**: `call` takes raw JSON from the shell where quoting mistakes are common.
///
/// **BUG THIS CATCHES**: Would catch serde errors escaping without the "Invalid JSON" prefix.
#[test]
fn given_malformed_json_when_converted_then_params_error_mentions_json() {
    // GIVEN: A serde_json parse failure
    let serde_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();

    // WHEN: Converting to CliError
    let error = CliError::from(serde_error);

    // THEN: The message names the problem
    assert!(error.to_string().contains("Invalid JSON"), "got: {error}");
}

/// **VALUE**: Verifies that CliError serializes as tagged JSON.
///
/// **WHY THIS MATTERS**: Scripts wrapping the binary parse error output by `type`.
///
/// **BUG THIS CATCHES**: Would catch removal of the serde tag/content attributes.
#[test]
fn given_bridge_variant_when_serialized_then_tagged_with_code() {
    // GIVEN: A bridge error with a code
    let error = CliError::Bridge {
        code: ErrorCode::Timeout,
        message: "Timed out".to_string(),
        location: common::ErrorLocation::caller(),
    };

    // WHEN: Serializing
    let json = serde_json::to_value(&error).unwrap();

    // THEN: Tag and code are present
    assert_eq!(json["type"], "Bridge");
    assert_eq!(json["data"]["code"], "TIMEOUT");
    assert_eq!(error.code(), Some(ErrorCode::Timeout));
}
