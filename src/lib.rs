//! Dice Server Library
//!
//! A telemetry-instrumented demo HTTP service with coordinated startup and
//! shutdown.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::{AggregateError, TeardownRegistry};
