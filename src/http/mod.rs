//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (bind, accept loop, middleware, lifecycle states)
//!     → dice.rs (the /roll route)
//!     → response to client
//! ```

pub mod dice;
pub mod server;

pub use server::{DrainError, HttpServer, ListenerState};
