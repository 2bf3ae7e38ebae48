use std::path::PathBuf;
use std::time::Duration;

use crate::probe::ProbeKind;

pub const DEFAULT_TARGET: &str = "192.168.1.0/24";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);
/// ARP needs longer for the broadcast and the reply.
pub const DEFAULT_ARP_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Config {
    /// CIDR block to enumerate.
    pub target: String,
    /// Probes to run, in order.
    pub scans: Vec<ProbeKind>,
    /// Worker count, `0` picks one automatically.
    pub workers: usize,
    pub timeout: Duration,
    pub arp_timeout: Duration,
    /// Interface handed to `arping`.
    pub interface: Option<String>,
    /// Comma-separated candidate port list for the TCP probe.
    pub ports_file: Option<PathBuf>,
    /// Directory that receives `result.txt`.
    pub output_dir: Option<PathBuf>,
    /// Hides the per-scan progress bar.
    pub no_progress: bool,
    pub quiet: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET.to_string(),
            scans: vec![ProbeKind::Icmp],
            workers: 0,
            timeout: DEFAULT_TIMEOUT,
            arp_timeout: DEFAULT_ARP_TIMEOUT,
            interface: None,
            ports_file: None,
            output_dir: None,
            no_progress: false,
            quiet: 0,
        }
    }
}
