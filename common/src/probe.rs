//! # Probe Contract
//!
//! The pluggable strategy the scan engine runs against every target, and the
//! result model it produces.
//!
//! A probe never fails for network-level reasons: a host that does not
//! answer is a normal, reportable [`ProbeResult`] with `alive == false`.
//! Environment problems (missing tool, missing privilege, unsupported
//! platform) are folded into the result's `detail` the same way, so one
//! broken strategy never aborts a run.

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::network::range::sort_key;

/// Outcome of running one probe against one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub address: IpAddr,
    pub alive: bool,
    pub probe_name: String,
    /// Human readable summary (open ports, resolved MAC, latency).
    pub detail: String,
    pub duration: Duration,
}

impl ProbeResult {
    pub fn alive(address: IpAddr, probe_name: &str, detail: impl Into<String>, duration: Duration) -> Self {
        Self {
            address,
            alive: true,
            probe_name: probe_name.to_string(),
            detail: detail.into(),
            duration,
        }
    }

    pub fn silent(address: IpAddr, probe_name: &str, detail: impl Into<String>, duration: Duration) -> Self {
        Self {
            address,
            alive: false,
            probe_name: probe_name.to_string(),
            detail: detail.into(),
            duration,
        }
    }
}

/// A host liveness strategy.
///
/// Implementations are shared between many workers at once and must only
/// hold read-only configuration (or state that is explicitly synchronised).
#[async_trait]
pub trait Probe: Send + Sync {
    /// Stable identifier used in reports.
    fn name(&self) -> &str;

    /// Probes a single address. `cancel` is the run-wide cancellation signal.
    async fn probe(&self, cancel: &CancellationToken, addr: IpAddr) -> ProbeResult;
}

/// The built-in probe strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeKind {
    Icmp,
    Tcp,
    Arp,
}

impl ProbeKind {
    pub const ALL: [ProbeKind; 3] = [ProbeKind::Icmp, ProbeKind::Tcp, ProbeKind::Arp];

    /// Section label used in exported reports.
    pub fn label(&self) -> &'static str {
        match self {
            ProbeKind::Icmp => "ICMP_SCAN",
            ProbeKind::Tcp => "TCP_SCAN",
            ProbeKind::Arp => "ARP_SCAN",
        }
    }

    pub fn needs_interface(&self) -> bool {
        matches!(self, ProbeKind::Arp)
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &str = match self {
            ProbeKind::Icmp => "ICMP Ping Scan",
            ProbeKind::Tcp => "TCP Connect Scan",
            ProbeKind::Arp => "ARP Scan",
        };
        f.write_str(name)
    }
}

/// Stable ascending sort by the canonical address key.
pub fn sort_results(results: &mut [ProbeResult]) {
    results.sort_by_key(|result| sort_key(&result.address));
}

/// Number of results reporting a live host.
pub fn count_alive(results: &[ProbeResult]) -> usize {
    results.iter().filter(|result| result.alive).count()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
