//! Startup and shutdown orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order: telemetry first, listener
//!   last
//! - Race the accept loop's terminal error against the interruption signal
//! - Sequence shutdown: drain the listener, then tear down telemetry
//! - Join every shutdown-phase failure into one aggregate result
//!
//! # Design Decisions
//! - Fail fast: a telemetry or bind failure aborts startup, releasing
//!   whatever was already constructed
//! - Telemetry outlives the listener during drain so in-flight requests can
//!   still emit spans and metrics
//! - The interruption trigger is consumed at most once; the losing race
//!   branch is ignored

use std::io;

use tokio::sync::mpsc;

use crate::config::ServiceConfig;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::{AggregateError, TeardownRegistry};
use crate::lifecycle::signals::Interrupt;
use crate::observability;

/// Drive the whole process lifecycle with OS interruption handling.
///
/// Returns once the service has fully terminated; a non-empty aggregate
/// means at least one shutdown-phase step failed.
pub async fn run(config: ServiceConfig) -> Result<(), AggregateError> {
    run_with(config, Interrupt::install()).await
}

/// Drive the process lifecycle with a caller-supplied interruption trigger.
pub async fn run_with(
    config: ServiceConfig,
    mut interrupt: Interrupt,
) -> Result<(), AggregateError> {
    let mut registry = TeardownRegistry::new();
    observability::setup(&config.telemetry, &mut registry)?;

    let mut server = HttpServer::new(&config);
    let mut serve_err = match server.start().await {
        Ok(rx) => rx,
        Err(bind) => {
            tracing::error!(
                error = %bind,
                address = %config.listener.bind_address,
                "failed to bind listener"
            );
            let mut errors = AggregateError::new();
            errors.push("listener", bind);
            if let Err(teardown) = registry.shutdown(config.telemetry.flush()) {
                errors.join(teardown);
            }
            return errors.into_result();
        }
    };

    tracing::info!("running");
    let terminal = wait_for_trigger(&mut serve_err, &mut interrupt).await;
    drop(interrupt);

    let mut errors = AggregateError::new();
    if let Some(e) = terminal {
        tracing::error!(error = %e, "accept loop failed");
        errors.push("server", e);
    }

    tracing::info!("shutting down");
    errors.join_result("drain", server.shutdown(config.shutdown.drain()).await);
    if let Err(teardown) = registry.shutdown(config.telemetry.flush()) {
        errors.join(teardown);
    }

    tracing::info!("terminated");
    errors.into_result()
}

/// Wait for whichever comes first: a terminal accept-loop error or the
/// interruption trigger. Returns the error when the accept loop lost the
/// race.
async fn wait_for_trigger(
    serve_err: &mut mpsc::Receiver<io::Error>,
    interrupt: &mut Interrupt,
) -> Option<io::Error> {
    tokio::select! {
        err = serve_err.recv() => match err {
            Some(e) => Some(e),
            // The accept loop ended without reporting; before any requested
            // shutdown that is a failure in its own right.
            None => Some(io::Error::other("accept loop terminated unexpectedly")),
        },
        _ = interrupt.recv() => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_server_error_wins_the_race() {
        let (tx, mut rx) = mpsc::channel(1);
        let (_handle, mut interrupt) = Interrupt::manual();
        tx.send(io::Error::other("accept failed")).await.unwrap();

        let terminal = wait_for_trigger(&mut rx, &mut interrupt).await;
        assert_eq!(terminal.unwrap().to_string(), "accept failed");
    }

    #[tokio::test]
    async fn test_interrupt_wins_the_race() {
        let (_tx, mut rx) = mpsc::channel::<io::Error>(1);
        let (handle, mut interrupt) = Interrupt::manual();
        handle.fire();

        let terminal = tokio::time::timeout(
            Duration::from_secs(1),
            wait_for_trigger(&mut rx, &mut interrupt),
        )
        .await
        .expect("race must resolve");
        assert!(terminal.is_none());
    }

    #[tokio::test]
    async fn test_closed_error_channel_counts_as_failure() {
        let (tx, mut rx) = mpsc::channel::<io::Error>(1);
        let (_handle, mut interrupt) = Interrupt::manual();
        drop(tx);

        let terminal = wait_for_trigger(&mut rx, &mut interrupt).await;
        assert!(terminal.is_some());
    }
}
