//! Isolated board wiring for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use workboard::config::{default_creators, RetentionConfig};
use workboard::gateway::{RecordGateway, SqliteGateway};
use workboard::model::WorkRequest;
use workboard::service::{AlwaysConfirm, BoardCommand, BoardService, CommandOutcome};
use workboard::sync::BoardFetcher;

/// In-memory store plus the fetcher and service on top of it.
pub struct TestHarness {
    pub gateway: Arc<SqliteGateway>,
    pub fetcher: Arc<BoardFetcher>,
    pub service: BoardService,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_retention(RetentionConfig::default())
    }

    pub fn with_retention(retention: RetentionConfig) -> Self {
        let gateway = Arc::new(SqliteGateway::open_in_memory().expect("in-memory store"));
        let fetcher = Arc::new(BoardFetcher::new(gateway.clone(), retention));
        let service = BoardService::new(Arc::clone(&fetcher), default_creators());
        Self {
            gateway,
            fetcher,
            service,
        }
    }

    /// Writes rows straight into the store, keeping their ids.
    pub fn seed(&self, rows: &[WorkRequest]) {
        self.gateway.import(rows).expect("seed rows");
    }

    pub async fn stored_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .gateway
            .fetch_all()
            .await
            .expect("fetch")
            .into_iter()
            .map(|r| r.id)
            .collect();
        ids.sort();
        ids
    }

    /// Runs a command with every confirmation accepted and returns the row id.
    pub async fn apply(&self, command: BoardCommand) -> i64 {
        match self.service.execute(command, &AlwaysConfirm).await {
            Ok(CommandOutcome::Applied(id)) => id,
            other => panic!("command did not apply: {:?}", other),
        }
    }
}
