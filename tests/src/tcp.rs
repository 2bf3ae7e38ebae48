use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use maki_core::ScanEngine;
use maki_core::probes::TcpProbe;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

async fn bind() -> (TcpListener, u16) {
    let listener = TcpListener::bind((LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

#[tokio::test]
async fn tcp_probe_through_engine_reports_open_ports() {
    let (_web, web_port) = bind().await;
    let (_tls, tls_port) = bind().await;
    let (closed_a, closed_a_port) = bind().await;
    let (closed_b, closed_b_port) = bind().await;
    drop(closed_a);
    drop(closed_b);

    let (low, high) = (web_port.min(tls_port), web_port.max(tls_port));
    let candidates: Vec<u16> = vec![closed_a_port, high, closed_b_port, low];
    let probe = TcpProbe::new(Duration::from_secs(1), candidates);

    let engine = ScanEngine::new(Arc::new(probe), 1);
    let results = engine.run(&CancellationToken::new(), &[LOCALHOST]).await;

    assert_eq!(results.len(), 1);
    assert!(results[0].alive);
    assert_eq!(results[0].probe_name, "TCP Connect Scan");
    assert_eq!(results[0].detail, format!("Ports: {low},{high}"));
}

#[tokio::test]
async fn tcp_probe_without_listeners_is_silent() {
    let (closed, closed_port) = bind().await;
    drop(closed);

    let probe = TcpProbe::new(Duration::from_millis(500), vec![closed_port]);
    let engine = ScanEngine::new(Arc::new(probe), 0);
    let results = engine.run(&CancellationToken::new(), &[LOCALHOST]).await;

    assert_eq!(results.len(), 1);
    assert!(!results[0].alive);
    assert_eq!(results[0].detail, "No open ports");
}
