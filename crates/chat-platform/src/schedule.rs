//! Deferred callbacks with cancelable handles.

use futures::future::BoxFuture;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Handle to a scheduled callback. Dropping it does not cancel the callback.
#[derive(Debug)]
pub struct ScheduledHandle {
    task: JoinHandle<()>,
}

impl ScheduledHandle {
    pub fn new(task: JoinHandle<()>) -> Self {
        Self { task }
    }

    /// Cancel the callback if it has not run yet.
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Runs a callback once after a delay.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, callback: BoxFuture<'static, ()>) -> ScheduledHandle;
}

/// Scheduler backed by tokio timers. Must be used from inside a runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, callback: BoxFuture<'static, ()>) -> ScheduledHandle {
        ScheduledHandle::new(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback.await;
        }))
    }
}

type IdleCallback = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Deactivation timer: fires `on_idle` once `timeout` passes without a `touch()`.
pub struct IdleTimer {
    scheduler: Arc<dyn Scheduler>,
    timeout: Duration,
    on_idle: IdleCallback,
    pending: Mutex<Option<ScheduledHandle>>,
}

impl IdleTimer {
    /// Create and arm the timer.
    pub fn start<F>(scheduler: Arc<dyn Scheduler>, timeout: Duration, on_idle: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        let timer = Self {
            scheduler,
            timeout,
            on_idle: Arc::new(on_idle),
            pending: Mutex::new(None),
        };
        timer.touch();
        timer
    }

    /// Record activity: cancels the pending deadline and schedules a new one.
    pub fn touch(&self) {
        let handle = self.scheduler.schedule(self.timeout, (self.on_idle)());
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.replace(handle) {
            previous.cancel();
        }
        debug!(timeout = ?self.timeout, "Idle timer reset");
    }

    /// Disarm without firing.
    pub fn stop(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = pending.take() {
            handle.cancel();
        }
    }
}

impl Drop for IdleTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
