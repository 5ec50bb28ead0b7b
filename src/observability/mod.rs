//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! setup():
//!     propagator (trace-context + baggage) → installed process-wide
//!     traces.rs  → tracer provider → teardown registered → installed
//!     metrics.rs → meter provider  → teardown registered → installed
//!
//! teardown (via lifecycle::TeardownRegistry):
//!     providers flush and stop in registration order
//! ```
//!
//! # Design Decisions
//! - Producers reach the tracer/meter through the opentelemetry `global`
//!   registry, which also lets tests substitute no-op implementations
//! - Each unit's teardown is registered before the next unit is built, so a
//!   failure mid-setup releases exactly what already succeeded
//! - Setup runs strictly before the listener serves and teardown strictly
//!   after it drains; request tasks read the handles without locks

pub mod logging;
pub mod metrics;
pub mod traces;

use std::time::Duration;

use opentelemetry::global;
use opentelemetry::propagation::TextMapCompositePropagator;
use opentelemetry_sdk::propagation::{BaggagePropagator, TraceContextPropagator};
use opentelemetry_sdk::Resource;

use crate::config::schema::TelemetryConfig;
use crate::lifecycle::shutdown::{AggregateError, BoxError, TeardownRegistry};

/// Construct the telemetry pipeline and install the process-wide handles.
///
/// Each unit's teardown lands in `registry` before the next unit is
/// attempted. On a construction failure the registry is drained on the spot
/// and the returned error joins the construction failure with the rollback
/// result; the registry comes back empty either way.
///
/// Precondition: no pipeline is currently installed. Re-running setup
/// without draining the registry first is a contract violation, not a
/// supported reconfiguration.
pub fn setup(
    config: &TelemetryConfig,
    registry: &mut TeardownRegistry,
) -> Result<(), AggregateError> {
    global::set_text_map_propagator(propagator());

    let resource = Resource::builder()
        .with_service_name(config.service_name.clone())
        .build();

    match traces::build_provider(&config.traces, resource.clone()) {
        Ok(provider) => {
            let handle = provider.clone();
            registry.register("tracer provider", move |_budget| {
                handle.shutdown().map_err(Into::into)
            });
            global::set_tracer_provider(provider);
        }
        Err(e) => return Err(rollback(registry, "trace exporter", e, config.flush())),
    }

    match metrics::build_provider(&config.metrics, resource) {
        Ok(provider) => {
            let handle = provider.clone();
            registry.register("meter provider", move |_budget| {
                handle.shutdown().map_err(Into::into)
            });
            global::set_meter_provider(provider);
        }
        Err(e) => return Err(rollback(registry, "metric exporter", e, config.flush())),
    }

    tracing::info!(
        traces = ?config.traces.exporter,
        metrics = ?config.metrics.exporter,
        service_name = %config.service_name,
        "telemetry pipeline installed"
    );
    Ok(())
}

/// W3C trace-context plus baggage propagation.
fn propagator() -> TextMapCompositePropagator {
    TextMapCompositePropagator::new(vec![
        Box::new(TraceContextPropagator::new()),
        Box::new(BaggagePropagator::new()),
    ])
}

/// Join a construction failure with the teardown of everything built so far.
fn rollback(
    registry: &mut TeardownRegistry,
    label: &'static str,
    error: impl Into<BoxError>,
    budget: Duration,
) -> AggregateError {
    let mut errors = AggregateError::new();
    errors.push(label, error);
    if let Err(teardown) = registry.shutdown(budget) {
        errors.join(teardown);
    }
    errors
}

/// Append the signal path to a collector base endpoint unless already
/// present.
pub(crate) fn signal_url(endpoint: &str, path: &str) -> String {
    if endpoint.ends_with(path) {
        endpoint.to_string()
    } else if endpoint.ends_with('/') {
        format!("{endpoint}{path}")
    } else {
        format!("{endpoint}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_signal_url_appends_path_once() {
        assert_eq!(
            signal_url("http://127.0.0.1:4318", "v1/traces"),
            "http://127.0.0.1:4318/v1/traces"
        );
        assert_eq!(
            signal_url("http://127.0.0.1:4318/", "v1/traces"),
            "http://127.0.0.1:4318/v1/traces"
        );
        assert_eq!(
            signal_url("http://127.0.0.1:4318/v1/traces", "v1/traces"),
            "http://127.0.0.1:4318/v1/traces"
        );
    }

    #[test]
    fn test_rollback_tears_down_earlier_units() {
        let ran = Arc::new(AtomicBool::new(false));
        let mut registry = TeardownRegistry::new();
        let flag = ran.clone();
        registry.register("earlier unit", move |_| {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });

        let err = rollback(
            &mut registry,
            "failing unit",
            io::Error::other("construction failed"),
            Duration::from_secs(1),
        );

        assert!(ran.load(Ordering::SeqCst), "prior teardown must run");
        assert!(registry.is_empty());
        let labels: Vec<_> = err.causes().map(|c| c.label()).collect();
        assert_eq!(labels, ["failing unit"]);
    }

    #[test]
    fn test_rollback_joins_teardown_failures_after_construction_failure() {
        let mut registry = TeardownRegistry::new();
        registry.register("earlier unit", |_| Err(io::Error::other("flush failed").into()));

        let err = rollback(
            &mut registry,
            "failing unit",
            io::Error::other("construction failed"),
            Duration::from_secs(1),
        );

        let labels: Vec<_> = err.causes().map(|c| c.label()).collect();
        assert_eq!(labels, ["failing unit", "earlier unit"]);
    }
}
