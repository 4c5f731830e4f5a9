//! Bucketing and ordering of work requests for display.

pub mod partition;
pub mod pickup;
pub mod search;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use partition::{bucket_of, partition, BoardView, DEFAULT_DELETED_DISPLAY_CAP};
pub use pickup::{days_left, local_today, PickupLabel};
pub use search::matches_query;

/// One of the four mutually exclusive display partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    InProgress,
    Completed,
    Deleted,
    JustUpload,
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bucket::InProgress => write!(f, "in-progress"),
            Bucket::Completed => write!(f, "completed"),
            Bucket::Deleted => write!(f, "deleted"),
            Bucket::JustUpload => write!(f, "just-upload"),
        }
    }
}
