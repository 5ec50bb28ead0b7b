//! Tracer provider construction.

use std::time::Duration;

use opentelemetry_otlp::{ExporterBuildError, Protocol, WithExportConfig};
use opentelemetry_sdk::trace::{
    BatchConfigBuilder, BatchSpanProcessor, SdkTracerProvider, SpanExporter,
};
use opentelemetry_sdk::Resource;

use crate::config::schema::{ExporterKind, TraceExportConfig};

/// Per-export timeout for the OTLP trace exporter. Bounds how long a flush
/// can hang on an unreachable collector.
const EXPORT_TIMEOUT: Duration = Duration::from_secs(5);

/// Build the tracer provider for the configured exporter.
///
/// OTLP construction is non-blocking: an unreachable collector surfaces as
/// export failures later, not as a construction error here.
pub fn build_provider(
    config: &TraceExportConfig,
    resource: Resource,
) -> Result<SdkTracerProvider, ExporterBuildError> {
    match config.exporter {
        ExporterKind::Otlp => {
            let exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_http()
                .with_protocol(Protocol::HttpBinary)
                .with_endpoint(super::signal_url(&config.endpoint, "v1/traces"))
                .with_timeout(EXPORT_TIMEOUT)
                .build()?;
            Ok(batching_provider(exporter, config, resource))
        }
        ExporterKind::Stdout => Ok(batching_provider(
            opentelemetry_stdout::SpanExporter::default(),
            config,
            resource,
        )),
    }
}

fn batching_provider<E>(
    exporter: E,
    config: &TraceExportConfig,
    resource: Resource,
) -> SdkTracerProvider
where
    E: SpanExporter + Send + Sync + 'static,
{
    let processor = BatchSpanProcessor::builder(exporter)
        .with_batch_config(
            BatchConfigBuilder::default()
                .with_scheduled_delay(config.batch_delay())
                .build(),
        )
        .build();

    SdkTracerProvider::builder()
        .with_span_processor(processor)
        .with_resource(resource)
        .build()
}
