//! Debounced task scheduling.
//!
//! A change notification does not recompute immediately; it arms a short
//! timer, and only the timer that survives the quiet period runs its task.
//! Re-scheduling cancels the pending timer, so a burst of changes
//! collapses into a single run.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// Delayed single-task scheduler with last-writer-wins semantics.
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<CancellationToken>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Arm the timer for `task`, cancelling any previously pending run.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F, Fut>(&self, task: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let previous = self.pending.lock().replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }

        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => task().await,
            }
        });
    }

    /// Drop the pending run, if any, without executing it.
    pub fn cancel(&self) {
        if let Some(token) = self.pending.lock().take() {
            token.cancel();
        }
    }
}
