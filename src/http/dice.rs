//! The dice-rolling demo surface.

use std::sync::LazyLock;

use axum::routing::any;
use axum::Router;
use opentelemetry::global;
use opentelemetry::metrics::Counter;
use opentelemetry::trace::{Span, Tracer};
use opentelemetry::KeyValue;
use rand::Rng;

/// Instrumentation scope for spans and metrics emitted here.
const SCOPE: &str = "dice_server";

/// Rolls-by-value counter. Created on first use so it binds to the meter
/// provider installed during telemetry setup.
static ROLL_COUNTER: LazyLock<Counter<u64>> = LazyLock::new(|| {
    global::meter(SCOPE)
        .u64_counter("dice.rolls")
        .with_description("The number of rolls by roll value")
        .with_unit("{roll}")
        .build()
});

/// The demo routes: a single method-agnostic `/roll`.
pub fn routes() -> Router {
    Router::new().route("/roll", any(roll))
}

async fn roll() -> String {
    let tracer = global::tracer(SCOPE);
    let mut span = tracer.start("roll");

    let value = rand::thread_rng().gen_range(1..=6);
    let roll_value = KeyValue::new("roll.value", value as i64);
    span.set_attribute(roll_value.clone());
    ROLL_COUNTER.add(1, &[roll_value]);

    format!("{value}\n")
}
