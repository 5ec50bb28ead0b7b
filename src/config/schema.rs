//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the dice server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Graceful shutdown settings.
    pub shutdown: ShutdownConfig,

    /// Telemetry pipeline settings.
    pub telemetry: TelemetryConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Graceful shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// How long in-flight requests may take to finish once draining starts.
    pub drain_secs: u64,
}

impl ShutdownConfig {
    /// Drain deadline as a [`Duration`].
    pub fn drain(&self) -> Duration {
        Duration::from_secs(self.drain_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self { drain_secs: 10 }
    }
}

/// Telemetry pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Value of the `service.name` resource attribute.
    pub service_name: String,

    /// Budget for flushing buffered telemetry during teardown.
    pub flush_secs: u64,

    /// Trace export settings.
    pub traces: TraceExportConfig,

    /// Metric export settings.
    pub metrics: MetricExportConfig,
}

impl TelemetryConfig {
    /// Flush budget as a [`Duration`].
    pub fn flush(&self) -> Duration {
        Duration::from_secs(self.flush_secs)
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "dice-server".to_string(),
            flush_secs: 5,
            traces: TraceExportConfig::default(),
            metrics: MetricExportConfig::default(),
        }
    }
}

/// Which exporter implementation a telemetry signal uses.
///
/// Both implementations satisfy the same construct/teardown contract, so the
/// choice has no effect on lifecycle behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExporterKind {
    /// OTLP over HTTP to a collector endpoint.
    Otlp,
    /// Console exporter printing to stdout.
    Stdout,
}

/// Trace export settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TraceExportConfig {
    /// Exporter implementation.
    pub exporter: ExporterKind,

    /// Collector base endpoint; `/v1/traces` is appended when missing.
    pub endpoint: String,

    /// Batch processor scheduled delay in milliseconds.
    pub batch_delay_millis: u64,
}

impl TraceExportConfig {
    /// Batch delay as a [`Duration`].
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_millis)
    }
}

impl Default for TraceExportConfig {
    fn default() -> Self {
        Self {
            exporter: ExporterKind::Otlp,
            endpoint: "http://127.0.0.1:4318".to_string(),
            batch_delay_millis: 1_000,
        }
    }
}

/// Metric export settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricExportConfig {
    /// Exporter implementation.
    pub exporter: ExporterKind,

    /// Collector base endpoint; `/v1/metrics` is appended when missing.
    pub endpoint: String,

    /// Periodic reader interval in seconds.
    pub interval_secs: u64,
}

impl MetricExportConfig {
    /// Export interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for MetricExportConfig {
    fn default() -> Self {
        Self {
            exporter: ExporterKind::Stdout,
            endpoint: "http://127.0.0.1:4318".to_string(),
            interval_secs: 3,
        }
    }
}
