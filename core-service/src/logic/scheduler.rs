//! Recurring Tasks
//!
//! Fixed-interval background jobs on `tokio::time::interval`. The first run
//! starts immediately; a run that overshoots the interval delays the next one
//! instead of bursting. Every task stops on its [`CancellationToken`].

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Shortest accepted period
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct Recurring {
    name: String,
    interval: Duration,
    cancel: CancellationToken,
}

impl Recurring {
    pub fn new(name: impl Into<String>, interval: Duration) -> Self {
        Self::with_token(name, interval, CancellationToken::new())
    }

    /// Share a token, e.g. a child of the process shutdown token.
    ///
    /// Periods below [`MIN_INTERVAL`] are raised to it.
    pub fn with_token(name: impl Into<String>, interval: Duration, cancel: CancellationToken) -> Self {
        let name = name.into();
        let interval = if interval < MIN_INTERVAL {
            log::warn!("{}: interval {:?} too short, using {:?}", name, interval, MIN_INTERVAL);
            MIN_INTERVAL
        } else {
            interval
        };
        Self { name, interval, cancel }
    }

    /// Run until cancelled; returns the number of completed runs
    pub async fn run<F, Fut>(self, mut task: F) -> u64
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        log::info!("{} started (every {:?})", self.name, self.interval);

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut runs = 0u64;

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = task() => runs += 1,
            }
        }

        log::info!("{} stopping after {} runs", self.name, runs);
        runs
    }

    pub fn spawn<F, Fut>(self, task: F) -> RecurringHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = self.cancel.clone();
        let join = tokio::spawn(self.run(task));
        RecurringHandle { cancel, join }
    }
}

/// Handle to a spawned [`Recurring`] task
#[derive(Debug)]
pub struct RecurringHandle {
    cancel: CancellationToken,
    join: JoinHandle<u64>,
}

impl RecurringHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Cancel and wait; returns completed runs (0 if the task panicked)
    pub async fn stop(self) -> u64 {
        self.cancel.cancel();
        self.join.await.unwrap_or_else(|e| {
            log::error!("recurring task ended abnormally: {}", e);
            0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    fn counting(interval_secs: u64) -> (Arc<AtomicU64>, RecurringHandle) {
        let count = Arc::new(AtomicU64::new(0));
        let counter = count.clone();
        let handle = Recurring::new("counter", Duration::from_secs(interval_secs)).spawn(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        (count, handle)
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_run_is_immediate() {
        let (count, handle) = counting(5);
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_on_interval() {
        let (count, handle) = counting(5);
        // runs at t = 0, 5, 10
        tokio::time::sleep(Duration::from_secs(12)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert_eq!(handle.stop().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_runs() {
        let (count, handle) = counting(3);
        tokio::time::sleep(Duration::from_secs(4)).await;
        let runs = handle.stop().await;
        assert_eq!(runs, 2);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_run_delays_next_tick() {
        let count = Arc::new(AtomicU64::new(0));
        let counter = count.clone();
        let handle = Recurring::new("slow", Duration::from_secs(2)).spawn(move || {
            let counter = counter.clone();
            async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        // run 1 ends at t = 5, run 2 at t = 10, no burst of missed ticks
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_clamped() {
        let count = Arc::new(AtomicU64::new(0));
        let counter = count.clone();
        let handle = Recurring::new("zero", Duration::ZERO).spawn(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        // runs at t = 0, 1, 2 instead of a panic inside the task
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(!handle.is_finished());
        assert_eq!(handle.stop().await, 3);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shared_token_cancels() {
        let token = CancellationToken::new();
        let task = Recurring::with_token("shared", Duration::from_secs(1), token.child_token());
        let handle = task.spawn(|| async {});
        tokio::time::sleep(Duration::from_millis(1500)).await;
        token.cancel();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(handle.is_finished());
        assert_eq!(handle.stop().await, 2);
    }
}
