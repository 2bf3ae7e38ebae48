//! # Maki Common
//!
//! Types shared by every crate in the workspace: the target enumerator,
//! the probe contract and its result model, the progress side channel,
//! run configuration and the error taxonomy.

pub mod config;
pub mod error;
pub mod network;
pub mod probe;
pub mod progress;
