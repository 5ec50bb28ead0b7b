//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, addresses parseable)
//! - Check collector endpoints when an OTLP exporter is selected
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::{ExporterKind, ServiceConfig};

/// A single semantic validation failure.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid bind address {0:?}")]
    BindAddress(String),

    #[error("invalid {signal} collector endpoint {endpoint:?}")]
    Endpoint {
        signal: &'static str,
        endpoint: String,
    },

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Semantic checks over a parsed configuration. Reports every violation.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.shutdown.drain_secs == 0 {
        errors.push(ValidationError::ZeroDuration("shutdown.drain_secs"));
    }
    if config.telemetry.flush_secs == 0 {
        errors.push(ValidationError::ZeroDuration("telemetry.flush_secs"));
    }
    if config.telemetry.traces.batch_delay_millis == 0 {
        errors.push(ValidationError::ZeroDuration(
            "telemetry.traces.batch_delay_millis",
        ));
    }
    if config.telemetry.metrics.interval_secs == 0 {
        errors.push(ValidationError::ZeroDuration(
            "telemetry.metrics.interval_secs",
        ));
    }

    if config.telemetry.traces.exporter == ExporterKind::Otlp
        && Url::parse(&config.telemetry.traces.endpoint).is_err()
    {
        errors.push(ValidationError::Endpoint {
            signal: "trace",
            endpoint: config.telemetry.traces.endpoint.clone(),
        });
    }
    if config.telemetry.metrics.exporter == ExporterKind::Otlp
        && Url::parse(&config.telemetry.metrics.endpoint).is_err()
    {
        errors.push(ValidationError::Endpoint {
            signal: "metric",
            endpoint: config.telemetry.metrics.endpoint.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
