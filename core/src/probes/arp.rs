//! ARP probe backed by the system `arping` utility.
//!
//! Only meaningful on the local segment. `arping` needs raw socket access,
//! so a permission failure is reported once per probe instance and then
//! folded quietly into each result.

use std::net::IpAddr;
use std::process::Stdio;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use maki_common::probe::{Probe, ProbeResult};
use pnet::util::MacAddr;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const NAME: &str = "ARP Scan";
const PERMISSION_MARKERS: [&str; 2] = ["operation not permitted", "permission denied"];

pub struct ArpProbe {
    timeout: Duration,
    interface: Option<String>,
    permission_warned: AtomicBool,
}

impl ArpProbe {
    pub fn new(timeout: Duration, interface: Option<String>) -> Self {
        Self {
            timeout,
            interface,
            permission_warned: AtomicBool::new(false),
        }
    }

    fn warn_permission_once(&self) {
        if !self.permission_warned.swap(true, Ordering::Relaxed) {
            warn!("ARP scan requires root privileges, please run with sudo");
        }
    }
}

#[async_trait]
impl Probe for ArpProbe {
    fn name(&self) -> &str {
        NAME
    }

    async fn probe(&self, cancel: &CancellationToken, addr: IpAddr) -> ProbeResult {
        let start: Instant = Instant::now();
        let os: &str = std::env::consts::OS;

        let Some(args) = arping_args(os, self.timeout, self.interface.as_deref(), addr) else {
            return ProbeResult::silent(addr, NAME, format!("arping not supported on {os}"), start.elapsed());
        };

        let mut cmd: Command = Command::new("arping");
        cmd.args(args).stdin(Stdio::null()).kill_on_drop(true);

        let output = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return ProbeResult::silent(addr, NAME, "Cancelled", start.elapsed());
            }
            output = cmd.output() => output,
        };
        let duration: Duration = start.elapsed();

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                debug!("Failed to run arping for {addr}: {e}");
                return ProbeResult::silent(addr, NAME, format!("arping unavailable: {e}"), duration);
            }
        };

        let text: String = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );

        if !output.status.success() {
            if is_permission_error(&text) {
                self.warn_permission_once();
                return ProbeResult::silent(addr, NAME, "Permission denied", duration);
            }
            return ProbeResult::silent(addr, NAME, "No ARP response", duration);
        }

        match parse_mac(&text) {
            Some(mac) => ProbeResult::alive(addr, NAME, format!("MAC: {mac}"), duration),
            None => ProbeResult::silent(addr, NAME, "No ARP response", duration),
        }
    }
}

/// Arguments for a single ARP request on `os`, `None` where `arping` is not
/// supported.
fn arping_args(os: &str, timeout: Duration, interface: Option<&str>, addr: IpAddr) -> Option<Vec<String>> {
    let (wait_flag, wait, iface_flag) = match os {
        "linux" => ("-w", timeout.as_secs().max(1).to_string(), "-I"),
        "macos" => ("-W", timeout.as_millis().to_string(), "-i"),
        _ => return None,
    };

    let mut args: Vec<String> = vec!["-c".to_string(), "1".to_string(), wait_flag.to_string(), wait];
    if let Some(interface) = interface {
        args.push(iface_flag.to_string());
        args.push(interface.to_string());
    }
    args.push(addr.to_string());
    Some(args)
}

fn is_permission_error(output: &str) -> bool {
    let lower: String = output.to_lowercase();
    PERMISSION_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// First MAC address in `output`, upper-cased and colon separated.
///
/// Accepts `aa:bb:cc:dd:ee:ff` and `aa-bb-cc-dd-ee-ff`, optionally wrapped
/// in brackets as printed by iputils `arping`.
fn parse_mac(output: &str) -> Option<String> {
    output
        .split(|c: char| c.is_whitespace() || matches!(c, '[' | ']' | '(' | ')' | ','))
        .filter(|token| token.len() == 17)
        .find_map(|token| MacAddr::from_str(&token.replace('-', ":")).ok())
        .map(|mac| mac.to_string().to_uppercase())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
