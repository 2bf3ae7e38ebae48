//! ICMP echo probe backed by the system `ping` utility.

use std::net::IpAddr;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use maki_common::probe::{Probe, ProbeResult};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const NAME: &str = "ICMP Ping";

pub struct IcmpProbe {
    timeout: Duration,
}

impl IcmpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Probe for IcmpProbe {
    fn name(&self) -> &str {
        NAME
    }

    async fn probe(&self, cancel: &CancellationToken, addr: IpAddr) -> ProbeResult {
        let start: Instant = Instant::now();

        let mut cmd: Command = Command::new("ping");
        cmd.args(ping_args(std::env::consts::OS, self.timeout, addr))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let status = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return ProbeResult::silent(addr, NAME, "Cancelled", start.elapsed());
            }
            status = cmd.status() => status,
        };
        let duration: Duration = start.elapsed();

        match status {
            Ok(status) if status.success() => {
                ProbeResult::alive(addr, NAME, format!("Response in {}ms", duration.as_millis()), duration)
            }
            Ok(_) => ProbeResult::silent(addr, NAME, "No response", duration),
            Err(e) => {
                debug!("Failed to run ping for {addr}: {e}");
                ProbeResult::silent(addr, NAME, format!("ping unavailable: {e}"), duration)
            }
        }
    }
}

/// Arguments for a single echo request on `os`.
///
/// Linux takes the wait in whole seconds, macOS and Windows in milliseconds.
fn ping_args(os: &str, timeout: Duration, addr: IpAddr) -> Vec<String> {
    let wait: String = match os {
        "linux" => timeout.as_secs().max(1).to_string(),
        _ => timeout.as_millis().to_string(),
    };
    let (count_flag, wait_flag) = match os {
        "windows" => ("-n", "-w"),
        _ => ("-c", "-W"),
    };
    vec![
        count_flag.to_string(),
        "1".to_string(),
        wait_flag.to_string(),
        wait,
        addr.to_string(),
    ]
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
