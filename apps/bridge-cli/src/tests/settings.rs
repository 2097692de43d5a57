// Tests for config resolution
// Every test that reads or writes process environment is #[serial].

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::settings::{DEBUG_ENV, URL_ENV, apply_env, config_dir, log_dir, resolve};

use bridge_core::BridgeConfig;

use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::TempDir;

fn cli_for(config: &Path) -> Cli {
    Cli {
        config: Some(config.to_path_buf()),
        url: None,
        debug: false,
        log_dir: None,
        command: Command::Watch {
            events: vec!["heartbeat".to_string()],
        },
    }
}

fn clear_env() {
    // SAFETY: callers are #[serial], so no other test thread touches the environment.
    unsafe {
        std::env::remove_var(URL_ENV);
        std::env::remove_var(DEBUG_ENV);
    }
}

fn set_env(key: &str, value: &str) {
    // SAFETY: callers are #[serial], so no other test thread touches the environment.
    unsafe {
        std::env::set_var(key, value);
    }
}

/// **VALUE**: Verifies an explicit `--config` directory is used as-is.
///
/// **WHY THIS MATTERS**: Tests and portable installs keep config next to the binary.
///
/// **BUG THIS CATCHES**: Would catch the explicit path being joined onto the platform dir.
#[test]
fn given_explicit_dir_when_config_dir_then_returned_unchanged() {
    // GIVEN
    let explicit = PathBuf::from("/opt/editor/config");

    // WHEN
    let dir = config_dir(Some(&explicit)).unwrap();

    // THEN
    assert_eq!(dir, explicit);
}

/// **VALUE**: Verifies the platform config dir gets the app's own subdirectory.
///
/// **WHY THIS MATTERS**: Writing bridge.json straight into ~/.config would collide with
/// other applications.
///
/// **BUG THIS CATCHES**: Would catch the `editor-bridge` component being dropped.
#[test]
fn given_no_explicit_dir_when_config_dir_then_app_subdirectory() {
    // GIVEN / WHEN
    let Ok(dir) = config_dir(None) else {
        // No platform config dir in this environment
        return;
    };

    // THEN
    assert!(dir.ends_with("editor-bridge"));
}

/// **VALUE**: Verifies an explicit log directory wins over the platform default.
///
/// **WHY THIS MATTERS**: `--log-dir` is how users redirect logs off a read-only home.
///
/// **BUG THIS CATCHES**: Would catch the flag being ignored.
#[test]
fn given_explicit_log_dir_when_resolved_then_used() {
    // GIVEN
    let explicit = PathBuf::from("/tmp/editor-bridge-logs");

    // WHEN / THEN
    assert_eq!(log_dir(Some(&explicit)), explicit);
    assert!(log_dir(None).to_string_lossy().contains("editor-bridge"));
}

/// **VALUE**: Verifies that an empty config directory resolves to the defaults.
///
/// **WHY THIS MATTERS**: A first run has no bridge.json; the CLI must still work.
///
/// **BUG THIS CATCHES**: Would catch a missing file being treated as an error.
#[test]
#[serial]
fn given_empty_config_dir_and_no_env_when_resolved_then_defaults() {
    // GIVEN: No file, no environment overrides
    clear_env();
    let temp_dir = TempDir::new().unwrap();

    // WHEN
    let config = resolve(&cli_for(temp_dir.path())).unwrap();

    // THEN
    assert_eq!(config, BridgeConfig::default());
}

/// **VALUE**: Verifies the precedence file < environment < flags.
///
/// **WHY THIS MATTERS**: Users override a checked-in config per shell or per invocation;
/// the wrong order makes overrides silently ineffective.
///
/// **BUG THIS CATCHES**: Would catch env being applied after flags, or the file after env.
#[test]
#[serial]
fn given_file_env_and_flag_when_resolved_then_flag_wins_over_env_over_file() {
    // GIVEN: A config file with its own url and retry count
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    BridgeConfig {
        url: "ws://127.0.0.1:1000".to_string(),
        max_retries: 7,
        ..BridgeConfig::default()
    }
    .save(temp_dir.path())
    .unwrap();

    // AND: An environment url and debug flag
    set_env(URL_ENV, "ws://127.0.0.1:2000");
    set_env(DEBUG_ENV, "yes");

    // WHEN: Resolving without a url flag
    let from_env = resolve(&cli_for(temp_dir.path())).unwrap();

    // AND: Resolving with a url flag
    let mut cli = cli_for(temp_dir.path());
    cli.url = Some("ws://127.0.0.1:3000".to_string());
    let from_flag = resolve(&cli).unwrap();

    clear_env();

    // THEN: Env beats the file, the flag beats env, untouched file values survive
    assert_eq!(from_env.url, "ws://127.0.0.1:2000");
    assert!(from_env.debug);
    assert_eq!(from_env.max_retries, 7);
    assert_eq!(from_flag.url, "ws://127.0.0.1:3000");
}

/// **VALUE**: Verifies a malformed boolean in the environment is rejected.
///
/// **WHY THIS MATTERS**: Treating "ture" as false would hide the user's intent.
///
/// **BUG THIS CATCHES**: Would catch lenient parsing that defaults unknown values.
#[test]
#[serial]
fn given_unparseable_debug_env_when_applied_then_config_error() {
    // GIVEN
    clear_env();
    set_env(DEBUG_ENV, "ture");
    let mut config = BridgeConfig::default();

    // WHEN
    let result = apply_env(&mut config);
    clear_env();

    // THEN
    assert!(matches!(result, Err(CliError::Config { .. })));
}

/// **VALUE**: Verifies an override is validated after it is applied.
///
/// **WHY THIS MATTERS**: An http:// URL from the environment must fail at startup, not at
/// the first request.
///
/// **BUG THIS CATCHES**: Would catch validation running only on the file contents.
#[test]
#[serial]
fn given_invalid_url_from_env_when_resolved_then_config_error() {
    // GIVEN
    clear_env();
    set_env(URL_ENV, "http://127.0.0.1:19876");
    let temp_dir = TempDir::new().unwrap();

    // WHEN
    let result = resolve(&cli_for(temp_dir.path()));
    clear_env();

    // THEN
    assert!(matches!(result, Err(CliError::Config { .. })));
}
