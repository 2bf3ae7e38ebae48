pub mod discover;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use maki_common::config::{Config, DEFAULT_TARGET};
use maki_common::probe::ProbeKind;

#[derive(Parser)]
#[command(name = "maki", version)]
#[command(about = "Concurrent host discovery for IP ranges.")]
pub struct CommandLine {
    /// Target block in CIDR notation
    #[arg(default_value = DEFAULT_TARGET)]
    pub target: String,

    /// Probe strategy to run
    #[arg(short, long, value_enum, default_value_t = ScanChoice::Icmp)]
    pub scan: ScanChoice,

    /// Network interface for the ARP scan (e.g. eth0, wlan0)
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Directory that receives result.txt
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Concurrent workers, 0 picks a value from the CPU count
    #[arg(short, long, default_value_t = 0)]
    pub workers: usize,

    /// Per-probe timeout for ICMP and TCP, in milliseconds
    #[arg(long, default_value_t = 2_000)]
    pub timeout_ms: u64,

    /// Per-probe timeout for ARP, in milliseconds
    #[arg(long, default_value_t = 5_000)]
    pub arp_timeout_ms: u64,

    /// Comma-separated list of candidate TCP ports
    #[arg(long)]
    pub ports_file: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Less output, repeat for even less
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub quiet: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ScanChoice {
    /// ICMP ping scan
    Icmp,
    /// TCP connect scan over common ports
    Tcp,
    /// ARP scan (local network, needs --interface)
    Arp,
    /// Every scan, one after the other
    All,
}

impl ScanChoice {
    pub fn kinds(&self) -> Vec<ProbeKind> {
        match self {
            ScanChoice::Icmp => vec![ProbeKind::Icmp],
            ScanChoice::Tcp => vec![ProbeKind::Tcp],
            ScanChoice::Arp => vec![ProbeKind::Arp],
            ScanChoice::All => ProbeKind::ALL.to_vec(),
        }
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn into_config(self) -> anyhow::Result<Config> {
        let scans: Vec<ProbeKind> = self.scan.kinds();
        if self.interface.is_none() && scans.iter().any(ProbeKind::needs_interface) {
            anyhow::bail!("a network interface (--interface) is required for the ARP scan");
        }

        Ok(Config {
            target: self.target,
            scans,
            workers: self.workers,
            timeout: Duration::from_millis(self.timeout_ms),
            arp_timeout: Duration::from_millis(self.arp_timeout_ms),
            interface: self.interface,
            ports_file: self.ports_file,
            output_dir: self.output,
            no_progress: self.no_progress,
            quiet: self.quiet,
        })
    }
}
