use bridge_cli::cli::{Cli, Command};
use bridge_cli::commands::{self, CallArgs};
use bridge_cli::error::CliError;
use bridge_cli::{logger, settings};

use bridge_core::Bridge;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Ignoring unreadable .env file: {e}");
        }
    }

    let config = settings::resolve(&cli);
    let debug = config.as_ref().map_or(cli.debug, |config| config.debug);

    let log_dir = settings::log_dir(cli.log_dir.as_deref());
    if let Err(e) = std::fs::create_dir_all(&log_dir)
        .map_err(|e| e.to_string())
        .and_then(|()| logger::initialize(&log_dir, debug).map_err(|e| e.to_string()))
    {
        eprintln!("Failed to set up logging in {}: {e}", log_dir.display());
        return ExitCode::FAILURE;
    }

    let result = match config {
        Ok(config) => run(cli.command, config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.code() {
                Some(code) => error!("[{code}] {e}"),
                None => error!("{e}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: bridge_core::BridgeConfig) -> Result<(), CliError> {
    match command {
        Command::Serve {
            port,
            heartbeat_secs,
        } => {
            let heartbeat = (heartbeat_secs > 0).then(|| Duration::from_secs(heartbeat_secs));
            commands::serve(port, heartbeat, commands::ctrl_c()).await
        }
        Command::Call {
            method,
            params,
            priority,
            timeout,
        } => {
            let bridge = Bridge::websocket(config)?;
            let args = CallArgs {
                method,
                params,
                priority,
                timeout_ms: timeout,
            };
            let report = commands::call(&bridge, &args).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Watch { events } => {
            let bridge = Bridge::websocket(config)?;
            let received = commands::watch(&bridge, &events, commands::ctrl_c()).await?;
            info!("Stopped watching after {received} event(s)");
            Ok(())
        }
    }
}
