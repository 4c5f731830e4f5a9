//! Snapshot fetching, retention and periodic sync.

pub mod fetcher;
pub mod retention;
pub mod scheduler;

pub use fetcher::{BoardFetcher, FetchOutcome, Snapshot, FETCH_ERROR_PREFIX};
pub use retention::RetentionPlan;
pub use scheduler::SyncScheduler;
