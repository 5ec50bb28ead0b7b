//! HTTP server setup and lifecycle.
//!
//! # Responsibilities
//! - Create the Axum router and wire up middleware (request ID, tracing,
//!   timeouts)
//! - Bind the listener and run the accept loop
//! - Graceful shutdown: stop accepting, drain in-flight requests, force-close
//!   whatever remains at the drain deadline

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::{RequestBodyTimeoutLayer, TimeoutLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServiceConfig;
use crate::http::dice;

/// Bound on reading a request body from a slow client.
const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Bound on producing and writing a response.
const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the listener is in its lifecycle.
///
/// States only move forward; nothing transitions back to `Serving`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Stopped,
    Serving,
    Draining,
    Closed,
}

/// Failure modes of a graceful drain.
#[derive(Debug, Error)]
pub enum DrainError {
    /// In-flight requests outlived the drain deadline and were cut off.
    #[error("drain deadline of {0:?} exceeded; remaining connections were forcibly closed")]
    DeadlineExceeded(Duration),
}

/// The listening HTTP server.
pub struct HttpServer {
    bind_address: String,
    router: Router,
    state: watch::Sender<ListenerState>,
    local_addr: Option<SocketAddr>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    serve_task: Option<JoinHandle<()>>,
}

impl HttpServer {
    /// Create a server exposing the demo routes.
    pub fn new(config: &ServiceConfig) -> Self {
        Self::with_router(config, dice::routes())
    }

    /// Create a server around a caller-supplied router.
    ///
    /// The ambient middleware stack is applied on top of `routes`.
    pub fn with_router(config: &ServiceConfig, routes: Router) -> Self {
        let router = routes
            .layer(TimeoutLayer::new(WRITE_TIMEOUT))
            .layer(RequestBodyTimeoutLayer::new(READ_TIMEOUT))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

        let (state, _) = watch::channel(ListenerState::Stopped);
        Self {
            bind_address: config.listener.bind_address.clone(),
            router,
            state,
            local_addr: None,
            shutdown_tx: None,
            serve_task: None,
        }
    }

    /// Observe lifecycle state transitions.
    pub fn state(&self) -> watch::Receiver<ListenerState> {
        self.state.subscribe()
    }

    /// The bound address, once [`HttpServer::start`] has succeeded.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Bind the configured address and start accepting connections.
    ///
    /// A bind failure is returned directly. After a successful start, the
    /// returned channel yields the accept loop's terminal error if it ever
    /// suffers one; a requested graceful shutdown completes the loop without
    /// reporting an error.
    pub async fn start(&mut self) -> io::Result<mpsc::Receiver<io::Error>> {
        if self.serve_task.is_some() {
            return Err(io::Error::other("listener already started"));
        }
        let listener = TcpListener::bind(&self.bind_address).await?;
        let addr = listener.local_addr()?;
        self.local_addr = Some(addr);

        let (err_tx, err_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let app = self.router.clone();

        let task = tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = served {
                let _ = err_tx.send(e).await;
            }
        });

        self.shutdown_tx = Some(shutdown_tx);
        self.serve_task = Some(task);
        self.state.send_replace(ListenerState::Serving);
        tracing::info!(address = %addr, "listening for connections");
        Ok(err_rx)
    }

    /// Stop accepting new connections and wait for in-flight requests.
    ///
    /// In-flight requests get until `drain` to finish; whatever remains is
    /// forcibly closed and the cutoff reported. Calling this when the server
    /// is not serving, or calling it a second time, is a no-op.
    pub async fn shutdown(&mut self, drain: Duration) -> Result<(), DrainError> {
        let (Some(trigger), Some(mut task)) = (self.shutdown_tx.take(), self.serve_task.take())
        else {
            return Ok(());
        };

        self.state.send_replace(ListenerState::Draining);
        tracing::info!(deadline = ?drain, "draining in-flight requests");
        // The send fails when the accept loop already terminated on its own;
        // joining below completes immediately in that case.
        let _ = trigger.send(());

        let result = match tokio::time::timeout(drain, &mut task).await {
            Ok(_) => Ok(()),
            Err(_) => {
                task.abort();
                let _ = task.await;
                Err(DrainError::DeadlineExceeded(drain))
            }
        };

        self.state.send_replace(ListenerState::Closed);
        tracing::info!("listener closed");
        result
    }
}
