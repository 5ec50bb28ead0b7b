//! Meter provider construction.

use std::time::Duration;

use opentelemetry_otlp::{ExporterBuildError, Protocol, WithExportConfig};
use opentelemetry_sdk::metrics::exporter::PushMetricExporter;
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::Resource;

use crate::config::schema::{ExporterKind, MetricExportConfig};

/// Per-export timeout for the OTLP metric exporter.
const EXPORT_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the meter provider for the configured exporter.
pub fn build_provider(
    config: &MetricExportConfig,
    resource: Resource,
) -> Result<SdkMeterProvider, ExporterBuildError> {
    match config.exporter {
        ExporterKind::Otlp => {
            let exporter = opentelemetry_otlp::MetricExporter::builder()
                .with_http()
                .with_protocol(Protocol::HttpBinary)
                .with_endpoint(super::signal_url(&config.endpoint, "v1/metrics"))
                .with_timeout(EXPORT_TIMEOUT)
                .build()?;
            Ok(periodic_provider(exporter, config, resource))
        }
        ExporterKind::Stdout => Ok(periodic_provider(
            opentelemetry_stdout::MetricExporter::default(),
            config,
            resource,
        )),
    }
}

fn periodic_provider<E>(
    exporter: E,
    config: &MetricExportConfig,
    resource: Resource,
) -> SdkMeterProvider
where
    E: PushMetricExporter + 'static,
{
    let reader = PeriodicReader::builder(exporter)
        .with_interval(config.interval())
        .build();

    SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(resource)
        .build()
}
