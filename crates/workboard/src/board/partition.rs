use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::search::matches_query;
use super::Bucket;
use crate::model::WorkRequest;

/// How many deleted rows are shown even before retention prunes the rest.
pub const DEFAULT_DELETED_DISPLAY_CAP: usize = 10;

/// A snapshot split into ordered buckets.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub in_progress: Vec<WorkRequest>,
    pub completed: Vec<WorkRequest>,
    pub deleted: Vec<WorkRequest>,
    pub just_upload: Vec<WorkRequest>,
}

impl BoardView {
    pub fn bucket(&self, bucket: Bucket) -> &[WorkRequest] {
        match bucket {
            Bucket::InProgress => &self.in_progress,
            Bucket::Completed => &self.completed,
            Bucket::Deleted => &self.deleted,
            Bucket::JustUpload => &self.just_upload,
        }
    }

    /// Narrows the in-progress and completed buckets to rows matching `query`.
    pub fn search(mut self, query: &str) -> Self {
        if query.is_empty() {
            return self;
        }
        self.in_progress.retain(|r| matches_query(r, query));
        self.completed.retain(|r| matches_query(r, query));
        self
    }

    pub fn len(&self) -> usize {
        self.in_progress.len() + self.completed.len() + self.deleted.len() + self.just_upload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolves the bucket of a row. Deleted wins over just-upload, which wins
/// over completed.
pub fn bucket_of(row: &WorkRequest) -> Bucket {
    if row.is_deleted {
        Bucket::Deleted
    } else if row.just_upload() {
        Bucket::JustUpload
    } else if row.completed {
        Bucket::Completed
    } else {
        Bucket::InProgress
    }
}

/// Splits a snapshot into buckets and orders each one.
///
/// The deleted bucket is additionally truncated to `deleted_display_cap`
/// most recent rows.
pub fn partition(rows: Vec<WorkRequest>, deleted_display_cap: usize) -> BoardView {
    let mut view = BoardView::default();
    for row in rows {
        match bucket_of(&row) {
            Bucket::InProgress => view.in_progress.push(row),
            Bucket::Completed => view.completed.push(row),
            Bucket::Deleted => view.deleted.push(row),
            Bucket::JustUpload => view.just_upload.push(row),
        }
    }

    view.in_progress
        .sort_by_key(|r| (Reverse(r.is_urgent), r.pickup_date, Reverse(r.created_at)));
    view.completed.sort_by_key(|r| Reverse(r.completed_at()));
    view.deleted
        .sort_by_key(|r| Reverse(r.deleted_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)));
    view.deleted.truncate(deleted_display_cap);
    view.just_upload.sort_by_key(|r| Reverse(r.created_at));

    view
}
