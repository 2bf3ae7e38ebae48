/// Receives `completed/total` updates from the scan engine.
///
/// Called from worker tasks while a lock is held, so implementations must
/// return quickly and never block.
pub trait ProgressReporter: Send + Sync {
    fn start(&self, _total: usize) {}

    fn advance(&self, completed: usize, total: usize);

    fn finish(&self) {}
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn advance(&self, _completed: usize, _total: usize) {}
}
