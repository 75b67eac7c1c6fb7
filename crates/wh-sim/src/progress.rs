//! Progress events and cooperative cancellation

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use wh_engine::TrialResult;

/// Emitted after every batch of trials.
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    pub completed: usize,
    pub total: usize,
    pub percent: f64,
    /// Last trial of the batch
    pub latest: Option<&'a TrialResult>,
}

impl Progress<'_> {
    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}

/// Receives progress events.
pub trait ProgressSink {
    fn on_progress(&mut self, progress: &Progress<'_>);
}

impl<F: FnMut(&Progress<'_>)> ProgressSink for F {
    fn on_progress(&mut self, progress: &Progress<'_>) {
        self(progress)
    }
}

/// Sink that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _progress: &Progress<'_>) {}
}

/// Shared stop flag, checked between trials.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
