//! Retention caps applied by a fetch cycle against a real store.

mod common;

use common::{RequestBuilder, TestHarness};
use workboard::config::RetentionConfig;
use workboard::sync::FetchOutcome;

#[tokio::test]
async fn completed_cap_keeps_newest_hundred() {
    let harness = TestHarness::new();
    let rows: Vec<_> = (1..=105)
        .map(|id| RequestBuilder::new(id).completed_at(1000 + id).build())
        .collect();
    harness.seed(&rows);

    let outcome = harness.fetcher.refresh().await;
    assert_eq!(outcome, FetchOutcome::Published { rows: 100, pruned: 5 });

    let remaining = harness.stored_ids().await;
    assert_eq!(remaining.len(), 100);
    // Rows 1..=5 have the oldest created_at.
    assert_eq!(remaining.first(), Some(&6));
    assert_eq!(harness.fetcher.view().completed.len(), 100);
}

#[tokio::test]
async fn deleted_cap_prunes_oldest_deletions_first() {
    let harness = TestHarness::new();
    // Creation order is the reverse of deletion order.
    let rows: Vec<_> = (1..=12)
        .map(|id| RequestBuilder::new(id).deleted_at(1000 - id).build())
        .collect();
    harness.seed(&rows);

    harness.fetcher.refresh().await;

    let remaining = harness.stored_ids().await;
    assert_eq!(remaining, (1..=10).collect::<Vec<_>>());
    let view = harness.fetcher.view();
    assert_eq!(view.deleted.len(), 10);
    assert_eq!(view.deleted[0].id, 1);
}

#[tokio::test]
async fn in_progress_rows_are_never_pruned() {
    let harness = TestHarness::with_retention(RetentionConfig {
        completed_cap: 1,
        deleted_cap: 1,
        deleted_display_cap: 1,
    });
    let rows: Vec<_> = (1..=20).map(|id| RequestBuilder::new(id).build()).collect();
    harness.seed(&rows);

    let outcome = harness.fetcher.refresh().await;
    assert_eq!(outcome, FetchOutcome::Published { rows: 20, pruned: 0 });
    assert_eq!(harness.stored_ids().await.len(), 20);
}

#[tokio::test]
async fn second_cycle_is_a_no_op() {
    let harness = TestHarness::new();
    let rows: Vec<_> = (1..=12)
        .map(|id| RequestBuilder::new(id).deleted_at(id).build())
        .collect();
    harness.seed(&rows);

    harness.fetcher.refresh().await;
    let outcome = harness.fetcher.refresh().await;
    assert_eq!(outcome, FetchOutcome::Published { rows: 10, pruned: 0 });
}
