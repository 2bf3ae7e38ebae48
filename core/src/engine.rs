//! # Scan Engine
//!
//! Runs one [`Probe`] against every address of a target list with a fixed
//! size pool of tokio workers.
//!
//! The whole target list is queued before the first worker starts. Each
//! worker claims the next address, checks the cancellation token, probes,
//! and appends the result under a lock. Once every worker has returned the
//! results are sorted by address, so output order never depends on which
//! host answered first.
//!
//! Each probe call runs in its own task, so a probe that panics costs only
//! its own target: that target is reported as a silent "probe failed"
//! result and the worker moves on.
//!
//! Cancellation drops work: a target that has not been claimed when the
//! token fires produces no result. Probes already in flight finish (or time
//! out) on their own and their results are kept.

use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use maki_common::probe::{self, Probe, ProbeResult};
use maki_common::progress::{NoProgress, ProgressReporter};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Ceiling for the automatically derived worker count.
pub const DEFAULT_MAX_WORKERS: usize = 100;
const WORKERS_PER_CPU: usize = 10;
const PROBE_FAILED: &str = "probe failed";

pub struct ScanEngine {
    probe: Arc<dyn Probe>,
    workers: usize,
    max_workers: usize,
    show_progress: bool,
    progress: Arc<dyn ProgressReporter>,
}

impl ScanEngine {
    /// Creates an engine running `probe` on `workers` concurrent tasks.
    ///
    /// `workers == 0` derives the count from the available parallelism,
    /// capped at [`DEFAULT_MAX_WORKERS`] (see [`ScanEngine::with_max_workers`]).
    pub fn new(probe: Arc<dyn Probe>, workers: usize) -> Self {
        Self {
            probe,
            workers,
            max_workers: DEFAULT_MAX_WORKERS,
            show_progress: true,
            progress: Arc::new(NoProgress),
        }
    }

    /// Changes the cap applied to the auto-derived worker count.
    ///
    /// An explicit worker count passed to [`ScanEngine::new`] is not capped.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    pub fn set_show_progress(&mut self, show: bool) {
        self.show_progress = show;
    }

    pub fn probe_name(&self) -> &str {
        self.probe.name()
    }

    /// The number of workers a run will start at most.
    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        let cpus: usize = std::thread::available_parallelism().map_or(1, |n| n.get());
        (cpus * WORKERS_PER_CPU).min(self.max_workers)
    }

    /// Probes every address in `targets` and returns the results sorted by
    /// address.
    ///
    /// Without cancellation there is exactly one result per target.
    pub async fn run(&self, cancel: &CancellationToken, targets: &[IpAddr]) -> Vec<ProbeResult> {
        let total: usize = targets.len();
        let workers: usize = self.worker_count().min(total);
        let started: Instant = Instant::now();

        debug!(
            probe = self.probe.name(),
            targets = total,
            workers,
            "starting scan"
        );

        let queue: Arc<Mutex<VecDeque<IpAddr>>> = Arc::new(Mutex::new(targets.iter().copied().collect()));
        let results: Arc<Mutex<Vec<ProbeResult>>> = Arc::new(Mutex::new(Vec::with_capacity(total)));
        let tracker: Option<Arc<Tracker>> = self.show_progress.then(|| {
            self.progress.start(total);
            Arc::new(Tracker {
                completed: Mutex::new(0),
                total,
                reporter: self.progress.clone(),
            })
        });

        let mut tasks: JoinSet<()> = JoinSet::new();
        for _ in 0..workers {
            let worker = Worker {
                probe: self.probe.clone(),
                cancel: cancel.clone(),
                queue: queue.clone(),
                results: results.clone(),
                tracker: tracker.clone(),
            };
            tasks.spawn(worker.drain());
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!("Scan worker stopped unexpectedly: {e}");
            }
        }

        if tracker.is_some() {
            self.progress.finish();
        }

        let mut results: Vec<ProbeResult> = std::mem::take(&mut *lock(&results));
        probe::sort_results(&mut results);

        info!(
            probe = self.probe.name(),
            results = results.len(),
            alive = probe::count_alive(&results),
            cancelled = cancel.is_cancelled(),
            "scan finished in {:.2}s",
            started.elapsed().as_secs_f64()
        );

        results
    }
}

struct Worker {
    probe: Arc<dyn Probe>,
    cancel: CancellationToken,
    queue: Arc<Mutex<VecDeque<IpAddr>>>,
    results: Arc<Mutex<Vec<ProbeResult>>>,
    tracker: Option<Arc<Tracker>>,
}

impl Worker {
    async fn drain(self) {
        loop {
            if self.cancel.is_cancelled() {
                return;
            }
            let Some(addr) = lock(&self.queue).pop_front() else {
                return;
            };

            let result: ProbeResult = self.probe_one(addr).await;
            lock(&self.results).push(result);

            if let Some(tracker) = &self.tracker {
                tracker.complete_one();
            }
        }
    }

    async fn probe_one(&self, addr: IpAddr) -> ProbeResult {
        let started: Instant = Instant::now();
        let probe: Arc<dyn Probe> = self.probe.clone();
        let cancel: CancellationToken = self.cancel.clone();

        match tokio::spawn(async move { probe.probe(&cancel, addr).await }).await {
            Ok(result) => result,
            Err(e) => {
                error!("{} failed on {addr}: {e}", self.probe.name());
                ProbeResult::silent(addr, self.probe.name(), PROBE_FAILED, started.elapsed())
            }
        }
    }
}

struct Tracker {
    completed: Mutex<usize>,
    total: usize,
    reporter: Arc<dyn ProgressReporter>,
}

impl Tracker {
    fn complete_one(&self) {
        let mut completed: MutexGuard<'_, usize> = lock(&self.completed);
        *completed += 1;
        self.reporter.advance(*completed, self.total);
    }
}

/// Locks a mutex, recovering the data if another worker panicked while
/// holding it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
