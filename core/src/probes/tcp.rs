//! TCP connect probe.
//!
//! Sweeps a fixed list of candidate ports on one host concurrently. A port
//! counts as open when the three-way handshake completes inside the timeout;
//! the connection is dropped straight away without exchanging data. The host
//! is alive if any candidate port is open.

use std::collections::BTreeSet;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use maki_common::probe::{Probe, ProbeResult};
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const NAME: &str = "TCP Connect Scan";

/// Used when no candidate port list can be loaded.
pub const FALLBACK_PORTS: [u16; 16] = [
    21, 22, 23, 25, 53, 80, 110, 135, 139, 143, 443, 445, 993, 995, 3389, 8080,
];

/// Upper bound on simultaneous connection attempts against a single host.
pub const MAX_CONCURRENT_CONNECTS: usize = 512;

pub struct TcpProbe {
    timeout: Duration,
    ports: Arc<[u16]>,
}

impl TcpProbe {
    /// Probe over an explicit candidate list. An empty list falls back to
    /// [`FALLBACK_PORTS`].
    pub fn new(timeout: Duration, ports: Vec<u16>) -> Self {
        let ports: Vec<u16> = if ports.is_empty() {
            warn!("Empty candidate port list, using the built-in port list");
            FALLBACK_PORTS.to_vec()
        } else {
            ports
        };
        Self {
            timeout,
            ports: ports.into(),
        }
    }

    /// Probe over the candidate list stored at `path`.
    ///
    /// A missing path, an unreadable file or a file without a single valid
    /// port all fall back to [`FALLBACK_PORTS`].
    pub fn from_port_file(timeout: Duration, path: Option<&Path>) -> Self {
        let ports: Vec<u16> = match path.map(load_port_file) {
            Some(Ok(ports)) if !ports.is_empty() => {
                info!("Loaded {} candidate ports", ports.len());
                ports
            }
            Some(Ok(_)) => {
                warn!("No valid ports in the port list, using the built-in port list");
                FALLBACK_PORTS.to_vec()
            }
            Some(Err(e)) => {
                warn!("Could not read the port list, using the built-in port list: {e:#}");
                FALLBACK_PORTS.to_vec()
            }
            None => FALLBACK_PORTS.to_vec(),
        };
        Self::new(timeout, ports)
    }

    pub fn ports(&self) -> &[u16] {
        &self.ports
    }
}

#[async_trait]
impl Probe for TcpProbe {
    fn name(&self) -> &str {
        NAME
    }

    async fn probe(&self, cancel: &CancellationToken, addr: IpAddr) -> ProbeResult {
        let start: Instant = Instant::now();
        let open_ports: Vec<u16> = sweep(cancel, addr, &self.ports, self.timeout).await;
        let duration: Duration = start.elapsed();

        if open_ports.is_empty() {
            ProbeResult::silent(addr, NAME, "No open ports", duration)
        } else {
            ProbeResult::alive(addr, NAME, format!("Ports: {}", format_ports(&open_ports)), duration)
        }
    }
}

/// Attempts a connection to every port in `ports` and returns the open ones
/// in ascending order.
///
/// Every attempt runs to completion, timeout or cancellation before this
/// returns.
pub async fn sweep(cancel: &CancellationToken, addr: IpAddr, ports: &[u16], connect_timeout: Duration) -> Vec<u16> {
    let permits: Arc<Semaphore> = Arc::new(Semaphore::new(MAX_CONCURRENT_CONNECTS));
    let mut attempts: JoinSet<Option<u16>> = JoinSet::new();

    for &port in ports {
        let permits = permits.clone();
        let cancel = cancel.clone();
        attempts.spawn(async move {
            let _permit = permits.acquire_owned().await.ok()?;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                open = is_port_open(SocketAddr::new(addr, port), connect_timeout) => open.then_some(port),
            }
        });
    }

    let mut open_ports: BTreeSet<u16> = BTreeSet::new();
    while let Some(joined) = attempts.join_next().await {
        if let Ok(Some(port)) = joined {
            open_ports.insert(port);
        }
    }
    open_ports.into_iter().collect()
}

async fn is_port_open(socket_addr: SocketAddr, connect_timeout: Duration) -> bool {
    matches!(timeout(connect_timeout, TcpStream::connect(socket_addr)).await, Ok(Ok(_)))
}

/// Reads a comma-separated port list, skipping entries that are not a port
/// number in `1..=65535`. Duplicates collapse and the result is sorted.
pub fn load_port_file(path: &Path) -> anyhow::Result<Vec<u16>> {
    let raw: String =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(parse_port_list(&raw))
}

pub fn parse_port_list(raw: &str) -> Vec<u16> {
    let mut ports: BTreeSet<u16> = BTreeSet::new();
    for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        match entry.parse::<u32>() {
            Ok(port @ 1..=65535) => {
                ports.insert(port as u16);
            }
            Ok(port) => warn!("Port {port} out of range (1-65535), skipping"),
            Err(_) => warn!("Invalid port number '{entry}', skipping"),
        }
    }
    ports.into_iter().collect()
}

pub fn format_ports(ports: &[u16]) -> String {
    ports
        .iter()
        .map(u16::to_string)
        .collect::<Vec<String>>()
        .join(",")
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
