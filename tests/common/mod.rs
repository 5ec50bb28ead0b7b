//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpStream;

use dice_server::config::{ExporterKind, ServiceConfig};

/// Build a config bound to the given port with console exporters and short
/// deadlines, so tests never need a collector and never wait long.
pub fn test_config(port: u16) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = format!("127.0.0.1:{port}");
    config.shutdown.drain_secs = 2;
    config.telemetry.flush_secs = 2;
    config.telemetry.traces.exporter = ExporterKind::Stdout;
    config.telemetry.metrics.exporter = ExporterKind::Stdout;
    config
}

/// Poll until something accepts TCP connections at `addr`.
#[allow(dead_code)]
pub async fn wait_until_serving(addr: SocketAddr) {
    for _ in 0..100 {
        if TcpStream::connect(addr).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server at {addr} never came up");
}

/// An HTTP client that talks straight to the local server.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("client construction")
}
