//! Retention caps for completed and soft-deleted rows.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};

use crate::config::RetentionConfig;
use crate::model::WorkRequest;

/// Ids selected for physical deletion by one retention pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionPlan {
    /// Completed, not deleted rows beyond the newest `completed_cap` by `created_at`.
    pub completed: Vec<i64>,
    /// Deleted rows beyond the newest `deleted_cap` by `deleted_at` (else `created_at`).
    pub deleted: Vec<i64>,
}

impl RetentionPlan {
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty() && self.deleted.is_empty()
    }

    pub fn len(&self) -> usize {
        self.completed.len() + self.deleted.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.completed.iter().chain(self.deleted.iter()).copied()
    }
}

fn excess<F>(mut rows: Vec<&WorkRequest>, cap: usize, recency: F) -> Vec<i64>
where
    F: Fn(&WorkRequest) -> DateTime<Utc>,
{
    if rows.len() <= cap {
        return Vec::new();
    }
    rows.sort_by_key(|r| (Reverse(recency(r)), Reverse(r.id)));
    rows.into_iter().skip(cap).map(|r| r.id).collect()
}

/// Selects the rows a fetch cycle should prune.
pub fn plan(rows: &[WorkRequest], caps: &RetentionConfig) -> RetentionPlan {
    let completed: Vec<&WorkRequest> = rows
        .iter()
        .filter(|r| r.completed && !r.is_deleted)
        .collect();
    let deleted: Vec<&WorkRequest> = rows.iter().filter(|r| r.is_deleted).collect();

    RetentionPlan {
        completed: excess(completed, caps.completed_cap, |r| r.created_at),
        deleted: excess(deleted, caps.deleted_cap, |r| {
            r.deleted_at.unwrap_or(r.created_at)
        }),
    }
}
