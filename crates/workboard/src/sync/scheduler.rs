//! Periodic board sync.
//!
//! Fetches once at start, then on every interval tick and on manual
//! triggers sent through a broadcast channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::fetcher::{BoardFetcher, FetchOutcome};

pub struct SyncScheduler {
    fetcher: Arc<BoardFetcher>,
    interval: Duration,
    shutdown: Arc<AtomicBool>,
    trigger: broadcast::Sender<()>,
}

impl SyncScheduler {
    pub fn new(fetcher: Arc<BoardFetcher>, interval: Duration) -> Self {
        let (trigger, _) = broadcast::channel(16);
        Self {
            fetcher,
            interval,
            shutdown: Arc::new(AtomicBool::new(false)),
            trigger,
        }
    }

    /// Requests an immediate sync.
    pub fn trigger(&self) {
        let _ = self.trigger.send(());
    }

    /// Starts the sync loop on the current tokio runtime.
    pub fn start(&self) -> JoinHandle<()> {
        let fetcher = Arc::clone(&self.fetcher);
        let shutdown = Arc::clone(&self.shutdown);
        let interval = self.interval;
        let mut trigger_rx = self.trigger.subscribe();

        tokio::spawn(async move {
            // The first tick completes immediately: that is the start-up fetch.
            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                if shutdown.load(Ordering::Acquire) {
                    break;
                }

                tokio::select! {
                    _ = interval_timer.tick() => {},
                    Ok(()) = trigger_rx.recv() => {
                        log::info!("Manual board sync triggered");
                    },
                }

                if shutdown.load(Ordering::Acquire) {
                    break;
                }

                match fetcher.refresh().await {
                    FetchOutcome::Published { pruned, .. } if pruned > 0 => {
                        log::info!("Board sync: pruned {} rows", pruned);
                    }
                    FetchOutcome::Failed(e) => log::error!("Board sync failed: {}", e),
                    _ => {}
                }
            }
            log::debug!("Board sync loop stopped");
        })
    }

    /// Signals the scheduler to stop and wakes the loop.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Release);
        let _ = self.trigger.send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetentionConfig;
    use crate::gateway::SqliteGateway;

    fn fetcher() -> Arc<BoardFetcher> {
        let gateway = Arc::new(SqliteGateway::open_in_memory().unwrap());
        Arc::new(BoardFetcher::new(gateway, RetentionConfig::default()))
    }

    #[tokio::test]
    async fn test_scheduler_fetches_at_start_and_stops() {
        let fetcher = fetcher();
        let mut rx = fetcher.subscribe();
        let scheduler = SyncScheduler::new(Arc::clone(&fetcher), Duration::from_secs(3600));
        let handle = scheduler.start();

        tokio::time::timeout(Duration::from_secs(5), rx.changed())
            .await
            .expect("no start-up fetch")
            .unwrap();
        assert!(fetcher.snapshot().fetched_at.is_some());

        scheduler.stop();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("scheduler did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_manual_trigger() {
        let fetcher = fetcher();
        let mut rx = fetcher.subscribe();
        let scheduler = SyncScheduler::new(Arc::clone(&fetcher), Duration::from_secs(3600));
        let handle = scheduler.start();

        rx.changed().await.unwrap();
        let first = fetcher.snapshot().fetched_at;

        scheduler.trigger();
        tokio::time::timeout(Duration::from_secs(5), rx.changed())
            .await
            .expect("trigger did not fetch")
            .unwrap();
        assert!(fetcher.snapshot().fetched_at >= first);

        scheduler.stop();
        handle.await.unwrap();
    }
}
