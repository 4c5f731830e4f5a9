//! Keeps the local snapshot of the `request` table.
//!
//! Each fetch reads the whole table, prunes rows beyond the retention caps,
//! and publishes the result on a `watch` channel. A failed fetch publishes
//! an empty snapshot with a readable error; nothing propagates past
//! [`BoardFetcher::refresh`].

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use tokio::sync::{watch, Mutex};

use super::retention::{self, RetentionPlan};
use crate::board::{partition, BoardView};
use crate::config::RetentionConfig;
use crate::gateway::GatewayHandle;
use crate::model::WorkRequest;

/// Prefix for errors shown when the table cannot be read.
pub const FETCH_ERROR_PREFIX: &str = "데이터 로딩 실패";

/// A published board state.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub rows: Vec<WorkRequest>,
    /// Last user-visible error. Cleared by the next successful fetch.
    pub error: Option<String>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn find(&self, id: i64) -> Option<&WorkRequest> {
        self.rows.iter().find(|r| r.id == id)
    }
}

/// What a call to [`BoardFetcher::refresh`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Published { rows: usize, pruned: usize },
    Failed(String),
    /// Another fetch was in flight.
    Skipped,
}

pub struct BoardFetcher {
    gateway: GatewayHandle,
    retention: RetentionConfig,
    tx: watch::Sender<Arc<Snapshot>>,
    in_flight: Mutex<()>,
}

impl BoardFetcher {
    pub fn new(gateway: GatewayHandle, retention: RetentionConfig) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(Snapshot::default()));
        Self {
            gateway,
            retention,
            tx,
            in_flight: Mutex::new(()),
        }
    }

    pub fn gateway(&self) -> &GatewayHandle {
        &self.gateway
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.tx.borrow())
    }

    pub fn find(&self, id: i64) -> Option<WorkRequest> {
        self.tx.borrow().find(id).cloned()
    }

    /// Partitioned view of the current snapshot.
    pub fn view(&self) -> BoardView {
        partition(self.snapshot().rows.clone(), self.retention.deleted_display_cap)
    }

    /// Fetches unless a fetch is already running.
    pub async fn refresh(&self) -> FetchOutcome {
        match self.in_flight.try_lock() {
            Ok(_guard) => self.fetch_and_publish().await,
            Err(_) => {
                log::debug!("Fetch already in flight, skipping");
                FetchOutcome::Skipped
            }
        }
    }

    /// Fetches after any in-flight fetch finishes. Used after mutations so
    /// the published state reflects the write.
    pub async fn refresh_now(&self) -> FetchOutcome {
        let _guard = self.in_flight.lock().await;
        self.fetch_and_publish().await
    }

    /// Publishes `message` as the visible error, keeping the current rows.
    pub fn record_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.tx.send_modify(|current| {
            let mut next = Snapshot::clone(&**current);
            next.error = Some(message);
            *current = Arc::new(next);
        });
    }

    async fn fetch_and_publish(&self) -> FetchOutcome {
        let rows = match self.gateway.fetch_all().await {
            Ok(rows) => rows,
            Err(e) => {
                let message = format!("{}: {}", FETCH_ERROR_PREFIX, e);
                log::error!("{}", message);
                self.tx.send_replace(Arc::new(Snapshot {
                    rows: Vec::new(),
                    error: Some(message.clone()),
                    fetched_at: Some(Utc::now()),
                }));
                return FetchOutcome::Failed(message);
            }
        };

        let plan = retention::plan(&rows, &self.retention);
        let (pruned, prune_error) = self.prune(&plan).await;

        let rows: Vec<WorkRequest> = rows
            .into_iter()
            .filter(|r| !pruned.contains(&r.id))
            .collect();
        let count = rows.len();

        self.tx.send_replace(Arc::new(Snapshot {
            rows,
            error: prune_error,
            fetched_at: Some(Utc::now()),
        }));
        log::debug!("Published snapshot: {} rows, {} pruned", count, pruned.len());

        FetchOutcome::Published {
            rows: count,
            pruned: pruned.len(),
        }
    }

    /// Issues the plan's deletes concurrently. Returns the ids that were
    /// removed and a non-fatal error message if any delete failed.
    async fn prune(&self, plan: &RetentionPlan) -> (HashSet<i64>, Option<String>) {
        if plan.is_empty() {
            return (HashSet::new(), None);
        }

        log::info!(
            "Retention: pruning {} completed and {} deleted rows",
            plan.completed.len(),
            plan.deleted.len()
        );

        let ids: Vec<i64> = plan.ids().collect();
        let results = join_all(ids.iter().map(|&id| self.gateway.delete(id))).await;

        let mut pruned = HashSet::new();
        let mut failures = Vec::new();
        for (id, result) in ids.into_iter().zip(results) {
            match result {
                Ok(()) => {
                    pruned.insert(id);
                }
                Err(e) => {
                    log::warn!("Retention delete of request {} failed: {}", id, e);
                    failures.push(id);
                }
            }
        }

        let error = if failures.is_empty() {
            None
        } else {
            Some(format!(
                "오래된 항목 정리 실패 ({}건): {:?}",
                failures.len(),
                failures
            ))
        };
        (pruned, error)
    }
}
