//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable for the process lifetime)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changing it is a redeploy, not a
//!   runtime operation
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{ExporterKind, ServiceConfig, TelemetryConfig};
