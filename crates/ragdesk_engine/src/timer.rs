//! Cancellable timers backed by tokio tasks.
//!
//! A [`TimerHandle`] owns its task and dropping it cancels the task.
//! Cancelling twice is a no-op; a tick already running is not interrupted.
use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub struct TimerHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl TimerHandle {
    /// Runs `callback` once after `delay`. Must be called inside a tokio runtime.
    pub fn once<F>(delay: Duration, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let task = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if !cancelled.is_cancelled() {
                        callback();
                    }
                }
            }
        });
        Self {
            token,
            task: Some(task),
        }
    }

    /// Runs `callback` every `period`, first after one full period, until it
    /// breaks or the handle is cancelled.
    pub fn every<F>(period: Duration, mut callback: F) -> Self
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        if cancelled.is_cancelled() || callback().is_break() {
                            break;
                        }
                    }
                }
            }
        });
        Self {
            token,
            task: Some(task),
        }
    }

    pub fn cancel(&mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
