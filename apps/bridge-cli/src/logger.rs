//! Logging for the `editor-bridge` binary.
//!
//! Dual output (colored stdout + plain log file) with a single, thread-safe
//! installation. The level is chosen once at startup from the debug flag.

use crate::error::CliError;

use common::ErrorLocation;

use std::io::stdout;
use std::panic::Location;
use std::path::Path;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use humantime::format_rfc3339;
use log::{LevelFilter, Record, info, warn};

static INIT_LOGGER_ONCE: Once = Once::new();

static LOGGER_ALREADY_CALLED: AtomicBool = AtomicBool::new(false);

pub const LOG_FILE_NAME: &str = "editor-bridge.log";

const LOGGER_INITIALIZED_MESSAGE_PREFIX: &str = "Logger initialized with level: ";

const LOGGER_ALREADY_INITIALIZED_MESSAGE: &str = "Logger already initialized";

/// Level used when debug logging is off.
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Level used when `--debug` or the config's `debug` flag is set. Frame tracing
/// in the bridge is emitted at this level.
const DEBUG_LOG_LEVEL: LevelFilter = LevelFilter::Debug;

pub fn level_for(debug: bool) -> LevelFilter {
    if debug {
        DEBUG_LOG_LEVEL
    } else {
        DEFAULT_LOG_LEVEL
    }
}

/// `[file:line]` suffix shared by both sinks.
pub(crate) fn source_location(record: &Record<'_>) -> String {
    format!(
        "[{}:{}]",
        record.file().unwrap_or("unknown"),
        record.line().unwrap_or(0)
    )
}

/// Initialize the logger with dual output (stdout + file).
///
/// Safe to call more than once: later calls log a warning and return Ok
/// without touching the installed logger.
///
/// # Errors
///
/// Returns [`CliError::Cli`] if the log file cannot be created or another
/// global logger is already installed.
pub fn initialize(log_dir: &Path, debug: bool) -> Result<(), CliError> {
    if LOGGER_ALREADY_CALLED.swap(true, Ordering::SeqCst) {
        warn!("{LOGGER_ALREADY_INITIALIZED_MESSAGE}");
        return Ok(());
    }

    let level = level_for(debug);
    let mut result = Ok(());

    INIT_LOGGER_ONCE.call_once(|| {
        result = initialize_internal(log_dir, level);
        if result.is_ok() {
            info!("{LOGGER_INITIALIZED_MESSAGE_PREFIX}{level:?}");
        }
    });

    result
}

/// Build both sinks and install them as the global logger.
///
/// Fails before touching global state when the log file cannot be created.
#[track_caller]
pub(crate) fn initialize_internal(log_dir: &Path, level: LevelFilter) -> Result<(), CliError> {
    let log_file_path = log_dir.join(LOG_FILE_NAME);

    let color_configuration = ColoredLevelConfig::new()
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red)
        .trace(Magenta);

    let base_dispatch = Dispatch::new()
        .level(level)
        // Handshake and socket chatter from the WebSocket stack stays out of debug output
        .level_for("tungstenite", LevelFilter::Warn)
        .level_for("tokio_tungstenite", LevelFilter::Warn);

    let stdout_dispatch = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message} {source}",
                date = format_rfc3339(SystemTime::now()),
                level = color_configuration.color(record.level()),
                message = message,
                source = source_location(record),
            ))
        })
        .chain(stdout());

    let file_dispatch = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message} {source}",
                date = format_rfc3339(SystemTime::now()),
                level = record.level(),
                message = message,
                source = source_location(record),
            ))
        })
        .chain(
            fern::log_file(&log_file_path).map_err(|e| CliError::Cli {
                message: format!(
                    "Failed to create log file {}: {e}",
                    log_file_path.display()
                ),
                location: ErrorLocation::from(Location::caller()),
            })?,
        );

    base_dispatch
        .chain(stdout_dispatch)
        .chain(file_dispatch)
        .apply()
        .map_err(|e| CliError::Cli {
            message: format!("Failed to initialize logger: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    Ok(())
}
