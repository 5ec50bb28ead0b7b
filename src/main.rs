//! Telemetry-instrumented dice-rolling HTTP service.
//!
//! # Lifecycle Overview
//!
//! ```text
//! main
//!   → logging init
//!   → config load (--config TOML, or defaults)
//!   → lifecycle::run
//!       → observability::setup          (propagator, tracer, meter)
//!       → HttpServer::start             (bind, accept loop)
//!       → select(accept-loop error, interruption signal)
//!       → HttpServer::shutdown          (bounded drain)
//!       → TeardownRegistry::shutdown    (flush exporters, in order)
//!   → exit 0 on clean shutdown, 1 when the joined error is non-empty
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use dice_server::config::{load_config, ServiceConfig};
use dice_server::{lifecycle, observability};

#[derive(Parser)]
#[command(name = "dice-server")]
#[command(about = "Telemetry-instrumented dice-rolling HTTP service", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    observability::logging::init();

    let cli = Cli::parse();
    let config = match cli.config {
        Some(path) => match load_config(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, path = %path.display(), "failed to load configuration");
                return ExitCode::FAILURE;
            }
        },
        None => ServiceConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        drain_secs = config.shutdown.drain_secs,
        "configuration loaded"
    );

    match lifecycle::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "shutdown completed with errors");
            ExitCode::FAILURE
        }
    }
}
