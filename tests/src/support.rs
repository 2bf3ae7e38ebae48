use std::collections::HashSet;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use maki_common::probe::{Probe, ProbeResult};
use rand::Rng;
use tokio_util::sync::CancellationToken;

/// Reports the configured addresses as alive, everything else as silent,
/// after a random delay of up to `max_delay`.
pub struct StubProbe {
    pub alive: HashSet<IpAddr>,
    pub max_delay: Duration,
}

impl StubProbe {
    pub fn new(alive: &[IpAddr], max_delay: Duration) -> Self {
        Self {
            alive: alive.iter().copied().collect(),
            max_delay,
        }
    }
}

#[async_trait]
impl Probe for StubProbe {
    fn name(&self) -> &str {
        "Stub Ping"
    }

    async fn probe(&self, _cancel: &CancellationToken, addr: IpAddr) -> ProbeResult {
        let max_ms: u64 = self.max_delay.as_millis() as u64;
        let delay: Duration = Duration::from_millis(rand::rng().random_range(0..=max_ms));
        tokio::time::sleep(delay).await;

        if self.alive.contains(&addr) {
            ProbeResult::alive(addr, self.name(), "Response", delay)
        } else {
            ProbeResult::silent(addr, self.name(), "No response", delay)
        }
    }
}

/// Sleeps for `delay` on every target and cancels the run once `trigger`
/// probes have completed.
pub struct CancellingProbe {
    pub delay: Duration,
    pub trigger: usize,
    pub cancel: CancellationToken,
    pub completed: std::sync::atomic::AtomicUsize,
}

#[async_trait]
impl Probe for CancellingProbe {
    fn name(&self) -> &str {
        "Cancelling"
    }

    async fn probe(&self, _cancel: &CancellationToken, addr: IpAddr) -> ProbeResult {
        tokio::time::sleep(self.delay).await;
        let done: usize = self.completed.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
        if done >= self.trigger {
            self.cancel.cancel();
        }
        ProbeResult::silent(addr, self.name(), "No response", self.delay)
    }
}

/// Results with their durations zeroed, for comparing runs.
pub fn without_durations(results: &[ProbeResult]) -> Vec<ProbeResult> {
    results
        .iter()
        .cloned()
        .map(|mut result| {
            result.duration = Duration::ZERO;
            result
        })
        .collect()
}
