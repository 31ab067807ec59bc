use std::future::Future;

use log::debug;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior};

/// Repeating scheduled callback with explicit start/stop.
///
/// The first tick fires one `period` after `start`. The callback returns
/// `false` to end the countdown itself. `stop` is idempotent and lets a
/// callback that is already running finish; `abort` also kills the task.
/// Dropping a `Countdown` stops it.
#[derive(Debug, Default)]
pub struct Countdown {
    stop_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Countdown {
    /// A countdown that is not running
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn start<F, Fut>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => {
                        debug!("Countdown stopped");
                        return;
                    }
                    _ = interval.tick() => {
                        if !on_tick().await {
                            debug!("Countdown finished");
                            return;
                        }
                    }
                }
            }
        });

        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            // The task may already have ended on its own
            let _ = tx.send(());
        }
    }

    pub fn abort(&mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.stop_tx.is_some() && self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.stop();
    }
}
