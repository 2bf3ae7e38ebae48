//! # Maki Core
//!
//! The concurrent probing engine and the probe strategies it drives.
//!
//! * **[`engine`]**: fixed-size worker pool that fans a target list out over
//!   a probe and returns address-ordered results.
//! * **[`probes`]**: ICMP, TCP connect and ARP strategies plus a factory.
//! * **[`report`]**: plain-text report of one or more scans.

pub mod engine;
pub mod probes;
pub mod report;

pub use engine::ScanEngine;
