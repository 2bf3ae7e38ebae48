use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::time::Duration;

use maki_common::network::range::{self, sort_key};
use maki_common::probe::ProbeResult;
use maki_core::ScanEngine;
use tokio_util::sync::CancellationToken;

use crate::support::{CancellingProbe, StubProbe, without_durations};

fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(a, b, c, d))
}

#[tokio::test]
async fn slash_30_end_to_end() {
    let targets: Vec<IpAddr> = range::enumerate("10.0.0.0/30").unwrap();
    assert_eq!(targets, vec![v4(10, 0, 0, 1), v4(10, 0, 0, 2)]);

    let probe = StubProbe::new(&[v4(10, 0, 0, 1)], Duration::from_millis(10));
    let engine = ScanEngine::new(Arc::new(probe), 0);
    let results: Vec<ProbeResult> = engine.run(&CancellationToken::new(), &targets).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].address, v4(10, 0, 0, 1));
    assert!(results[0].alive);
    assert_eq!(results[1].address, v4(10, 0, 0, 2));
    assert!(!results[1].alive);
}

#[tokio::test]
async fn slash_24_results_are_ordered_despite_random_latency() {
    let targets: Vec<IpAddr> = range::enumerate("192.168.7.0/24").unwrap();
    let alive: Vec<IpAddr> = targets.iter().copied().step_by(7).collect();

    let engine = ScanEngine::new(Arc::new(StubProbe::new(&alive, Duration::from_millis(15))), 32);
    let results: Vec<ProbeResult> = engine.run(&CancellationToken::new(), &targets).await;

    assert_eq!(results.len(), targets.len());
    assert!(results.windows(2).all(|w| sort_key(&w[0].address) < sort_key(&w[1].address)));

    let found: Vec<IpAddr> = results.iter().filter(|r| r.alive).map(|r| r.address).collect();
    assert_eq!(found, alive);
}

#[tokio::test]
async fn repeated_runs_are_identical_modulo_duration() {
    let targets: Vec<IpAddr> = range::enumerate("10.10.0.0/27").unwrap();
    let alive: Vec<IpAddr> = vec![v4(10, 10, 0, 3), v4(10, 10, 0, 17), v4(10, 10, 0, 30)];

    let engine = ScanEngine::new(Arc::new(StubProbe::new(&alive, Duration::from_millis(10))), 5);
    let first = engine.run(&CancellationToken::new(), &targets).await;
    let second = engine.run(&CancellationToken::new(), &targets).await;

    assert_eq!(without_durations(&first), without_durations(&second));
}

#[tokio::test]
async fn cancelled_before_start_yields_empty_set() {
    let targets: Vec<IpAddr> = range::enumerate("10.0.0.0/28").unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let engine = ScanEngine::new(Arc::new(StubProbe::new(&[], Duration::ZERO)), 4);
    let results = engine.run(&cancel, &targets).await;

    assert!(results.is_empty());
}

#[tokio::test]
async fn cancelled_mid_run_keeps_completed_results_sorted() {
    let targets: Vec<IpAddr> = range::enumerate("10.0.0.0/24").unwrap();
    let cancel = CancellationToken::new();
    let probe = CancellingProbe {
        delay: Duration::from_millis(5),
        trigger: 10,
        cancel: cancel.clone(),
        completed: AtomicUsize::new(0),
    };

    let engine = ScanEngine::new(Arc::new(probe), 2);
    let results = engine.run(&cancel, &targets).await;

    assert!(results.len() >= 10);
    assert!(results.len() < targets.len());
    assert!(results.windows(2).all(|w| sort_key(&w[0].address) < sort_key(&w[1].address)));
}
