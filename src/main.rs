//! supportbot - single-session IRC channel bot with an operator console.

use std::process::ExitCode;

use supportbot::config::Config;
use supportbot::console::Console;
use supportbot::state::{self, Session};
use supportbot::telemetry;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config_arg = std::env::args().nth(1);
    let (config, config_path) = Config::discover(config_arg.as_deref())?;

    telemetry::init(&config.logging.filter);
    match &config_path {
        Some(path) => info!(path = %path.display(), "configuration loaded"),
        None => info!("no configuration file, using defaults"),
    }

    let (events_tx, events_rx) = mpsc::channel(config.transport.event_queue);
    let session = Session::new(&config, events_tx).into_shared();

    let mut console = Console::new(
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        session.clone(),
        config.transport.quit_grace(),
    );

    tokio::select! {
        result = console.run() => {
            result?;
            info!("operator exit");
            Ok(ExitCode::SUCCESS)
        }
        result = state::run_events(session, events_rx) => {
            let detail = match result {
                Err(e) => {
                    error!(code = e.error_code(), error = %e, "fatal link error");
                    e.to_string()
                }
                Ok(()) => "event stream closed".to_string(),
            };
            println!("Error: {detail}");
            // The console may be parked in a blocking stdin read that would
            // stall runtime shutdown.
            std::process::exit(1);
        }
    }
}
