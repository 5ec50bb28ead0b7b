//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT)
//! - Translate the first signal into a one-shot in-process trigger
//! - Exit immediately on a second signal (no second drain)
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - The trigger fires at most once; consuming it disarms the graceful path
//! - Tests fire the trigger through a handle instead of raising signals

use tokio::sync::mpsc;

/// Receiving half of the one-shot interruption trigger.
pub struct Interrupt {
    rx: mpsc::Receiver<()>,
}

/// Sending half of the trigger, used by the signal task and by tests.
#[derive(Clone)]
pub struct InterruptHandle {
    tx: mpsc::Sender<()>,
}

impl Interrupt {
    /// Install OS signal handlers and return the trigger they feed.
    ///
    /// The first SIGINT/SIGTERM fires the trigger. A second signal makes the
    /// process exit immediately with status 130 instead of starting another
    /// drain.
    pub fn install() -> Self {
        let (handle, interrupt) = Self::manual();
        tokio::spawn(async move {
            wait_for_signal().await;
            tracing::info!("interruption signal received");
            handle.fire();

            wait_for_signal().await;
            tracing::warn!("second interruption signal received, exiting immediately");
            std::process::exit(130);
        });
        interrupt
    }

    /// Create a trigger fired manually through the returned handle.
    pub fn manual() -> (InterruptHandle, Interrupt) {
        let (tx, rx) = mpsc::channel(1);
        (InterruptHandle { tx }, Interrupt { rx })
    }

    /// Wait for the trigger to fire.
    ///
    /// If every handle is dropped without firing, this pends forever so a
    /// surrounding select moves on through its other branches.
    pub async fn recv(&mut self) {
        match self.rx.recv().await {
            Some(()) => {}
            None => std::future::pending().await,
        }
    }
}

impl InterruptHandle {
    /// Fire the trigger. Firings beyond the pending one are dropped.
    pub fn fire(&self) {
        let _ = self.tx.try_send(());
    }
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate =
            signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.expect("failed to install Ctrl+C handler");
            }
            _ = terminate.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fire_completes_recv() {
        let (handle, mut interrupt) = Interrupt::manual();
        handle.fire();
        tokio::time::timeout(Duration::from_secs(1), interrupt.recv())
            .await
            .expect("fired trigger should complete recv");
    }

    #[tokio::test]
    async fn test_recv_pends_until_fired() {
        let (_handle, mut interrupt) = Interrupt::manual();
        let waited = tokio::time::timeout(Duration::from_millis(50), interrupt.recv()).await;
        assert!(waited.is_err(), "recv must not complete before a firing");
    }

    #[tokio::test]
    async fn test_recv_pends_when_all_handles_dropped() {
        let (handle, mut interrupt) = Interrupt::manual();
        drop(handle);
        let waited = tokio::time::timeout(Duration::from_millis(50), interrupt.recv()).await;
        assert!(waited.is_err(), "a dropped handle must not look like a signal");
    }
}
