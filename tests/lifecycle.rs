//! End-to-end lifecycle orchestration tests.

use std::net::SocketAddr;
use std::time::Duration;

use dice_server::config::ExporterKind;
use dice_server::lifecycle::{run_with, Interrupt};

mod common;

#[tokio::test]
async fn test_interrupt_triggers_clean_shutdown() {
    let config = common::test_config(28411);
    let addr: SocketAddr = "127.0.0.1:28411".parse().unwrap();
    let (handle, interrupt) = Interrupt::manual();

    let service = tokio::spawn(run_with(config, interrupt));
    common::wait_until_serving(addr).await;

    handle.fire();
    let result = tokio::time::timeout(Duration::from_secs(10), service)
        .await
        .expect("shutdown timed out")
        .expect("service task panicked");
    assert!(result.is_ok(), "expected clean shutdown, got {result:?}");
}

#[tokio::test]
async fn test_second_interrupt_causes_no_second_shutdown() {
    let config = common::test_config(28412);
    let addr: SocketAddr = "127.0.0.1:28412".parse().unwrap();
    let (handle, interrupt) = Interrupt::manual();

    let service = tokio::spawn(run_with(config, interrupt));
    common::wait_until_serving(addr).await;

    handle.fire();
    handle.fire();
    let result = tokio::time::timeout(Duration::from_secs(10), service)
        .await
        .expect("shutdown timed out")
        .expect("service task panicked");
    assert!(result.is_ok(), "duplicate trigger must not break shutdown");
}

#[tokio::test]
async fn test_bind_failure_is_fatal_and_reported() {
    let occupied = tokio::net::TcpListener::bind("127.0.0.1:28413")
        .await
        .unwrap();
    let config = common::test_config(28413);
    let (_handle, interrupt) = Interrupt::manual();

    let err = run_with(config, interrupt)
        .await
        .expect_err("bind should fail");
    assert!(
        err.causes().any(|c| c.label() == "listener"),
        "bind failure missing from aggregate: {err}"
    );
    drop(occupied);
}

#[tokio::test]
async fn test_requests_served_with_unreachable_collector() {
    let mut config = common::test_config(28414);
    // Construction is non-blocking, so an unreachable collector must not
    // prevent startup; only the shutdown flush may fail.
    config.telemetry.traces.exporter = ExporterKind::Otlp;
    config.telemetry.traces.endpoint = "http://127.0.0.1:9".into();
    let addr: SocketAddr = "127.0.0.1:28414".parse().unwrap();
    let (handle, interrupt) = Interrupt::manual();

    let service = tokio::spawn(run_with(config, interrupt));
    common::wait_until_serving(addr).await;

    let body = common::client()
        .get(format!("http://{addr}/roll"))
        .send()
        .await
        .expect("service must serve despite unreachable collector")
        .text()
        .await
        .unwrap();
    let value: i32 = body.trim().parse().unwrap();
    assert!((1..=6).contains(&value));

    handle.fire();
    // The flush at teardown may or may not report the export failure in the
    // aggregate; the property under test is that it never blocks termination.
    let _ = tokio::time::timeout(Duration::from_secs(15), service)
        .await
        .expect("shutdown timed out")
        .expect("service task panicked");
}
