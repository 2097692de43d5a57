use bridge_core::DEFAULT_HOST_PORT;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Default period between `heartbeat` events emitted by `serve`.
pub const DEFAULT_HEARTBEAT_SECS: u64 = 5;

#[derive(Parser, Debug)]
#[command(name = "editor-bridge")]
#[command(about = "Resilient request/response bridge between an editor front-end and its host")]
pub struct Cli {
    /// Directory holding bridge.json (defaults to the platform config dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub config: Option<PathBuf>,

    /// Host endpoint URL, overrides config and EDITOR_BRIDGE_URL
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Enable debug logging and frame tracing
    #[arg(long, global = true)]
    pub debug: bool,

    /// Directory the log file is written to
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run a demo host endpoint on the loopback interface
    Serve {
        /// Port to listen on (0 picks a free port)
        #[arg(long, default_value_t = DEFAULT_HOST_PORT)]
        port: u16,

        /// Seconds between heartbeat events (0 disables them)
        #[arg(long, default_value_t = DEFAULT_HEARTBEAT_SECS)]
        heartbeat_secs: u64,
    },

    /// Send one request through the bridge and print the result
    Call {
        /// Method name, e.g. getFields
        method: String,

        /// JSON params (defaults to null)
        params: Option<String>,

        /// Queue priority; when set the call goes through the priority queue
        #[arg(long, allow_hyphen_values = true)]
        priority: Option<i32>,

        /// Per-request timeout in milliseconds
        #[arg(long, value_name = "MS")]
        timeout: Option<u64>,
    },

    /// Subscribe to host events and log them until interrupted
    Watch {
        /// Event names to subscribe to
        #[arg(required = true)]
        events: Vec<String>,
    },
}
