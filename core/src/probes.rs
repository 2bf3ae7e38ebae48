//! # Probe Strategies
//!
//! Concrete [`Probe`] implementations and a factory that builds one from a
//! [`ProbeKind`]. The engine only ever sees the trait object.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use maki_common::config::Config;
use maki_common::probe::{Probe, ProbeKind};

pub mod arp;
pub mod icmp;
pub mod tcp;

pub use arp::ArpProbe;
pub use icmp::IcmpProbe;
pub use tcp::TcpProbe;

/// Construction-time configuration shared by the probe strategies.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub timeout: Duration,
    pub arp_timeout: Duration,
    pub interface: Option<String>,
    pub ports_file: Option<PathBuf>,
}

impl From<&Config> for ProbeSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            timeout: cfg.timeout,
            arp_timeout: cfg.arp_timeout,
            interface: cfg.interface.clone(),
            ports_file: cfg.ports_file.clone(),
        }
    }
}

pub fn build(kind: ProbeKind, settings: &ProbeSettings) -> Arc<dyn Probe> {
    match kind {
        ProbeKind::Icmp => Arc::new(IcmpProbe::new(settings.timeout)),
        ProbeKind::Tcp => Arc::new(TcpProbe::from_port_file(
            settings.timeout,
            settings.ports_file.as_deref(),
        )),
        ProbeKind::Arp => Arc::new(ArpProbe::new(settings.arp_timeout, settings.interface.clone())),
    }
}
