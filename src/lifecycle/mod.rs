//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Telemetry setup → teardowns registered → listener starts serving
//!
//! Shutdown (startup.rs, on signal or listener failure):
//!     Stop accepting → drain in-flight (bounded) → tear down telemetry
//!     → joined error
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → one-shot graceful-shutdown trigger
//!     second signal → immediate exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: telemetry first, listener last
//! - Ordered shutdown is the reverse: the listener drains before telemetry
//!   flushes, so in-flight requests can still emit spans and metrics
//! - Every teardown failure is preserved in the aggregate, never dropped

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{AggregateError, BoxError, Cause, TeardownRegistry};
pub use signals::{Interrupt, InterruptHandle};
pub use startup::{run, run_with};
