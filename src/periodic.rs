//! Cancellable periodic task
//!
//! Both sampling loops run as one tokio task each: tick, then wait for the
//! next period or a cancel signal. Cancellation is cooperative and only
//! observed while waiting, so a tick in progress always completes.
//!
//! Ticks run on the blocking pool. A stalled read slows only its own loop
//! and never holds an async worker.

use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a running periodic loop. Dropping it cancels the loop.
pub struct PeriodicTask {
    name: &'static str,
    cancel_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl PeriodicTask {
    /// Spawn `tick` on `runtime`, first immediately and then once per `period`.
    pub fn spawn<F>(runtime: &Handle, name: &'static str, period: Duration, tick: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let tick = Arc::new(tick);

        let handle = runtime.spawn(async move {
            log::debug!("{} loop started ({}ms period)", name, period.as_millis());
            let mut interval = tokio::time::interval(period);
            // A stalled tick delays the cadence instead of bursting to catch up
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = cancel_rx.changed() => break,
                    _ = interval.tick() => {}
                }
                if *cancel_rx.borrow() {
                    break;
                }
                let tick = tick.clone();
                if let Err(e) = tokio::task::spawn_blocking(move || tick()).await {
                    log::error!("{} tick panicked: {}", name, e);
                }
            }
            log::debug!("{} loop exited", name);
        });

        Self {
            name,
            cancel_tx,
            handle,
        }
    }

    /// Request cancellation. Never blocks and never waits for the loop.
    pub fn cancel(&self) {
        if !self.cancel_tx.send_replace(true) {
            log::debug!("{} loop cancel requested", self.name);
        }
    }

    /// True while the loop has neither been cancelled nor exited
    pub fn is_active(&self) -> bool {
        !*self.cancel_tx.borrow() && !self.handle.is_finished()
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_task(period: Duration) -> (PeriodicTask, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let task = PeriodicTask::spawn(&Handle::current(), "test", period, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (task, count)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_immediately_then_each_period() {
        let (task, count) = counting_task(Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(task.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticking() {
        let (task, count) = counting_task(Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(10)).await;

        task.cancel();
        assert!(!task.is_active());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Second cancel is harmless
        task.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_first_poll_never_ticks() {
        let (task, count) = counting_task(Duration::from_secs(1));
        task.cancel();

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let (task, count) = counting_task(Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(task);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
