//! Shared test utilities for workboard integration tests.
//!
//! - `TestHarness` wires an in-memory store, fetcher and service together
//! - `RequestBuilder` creates stored rows with fixed ids and timestamps

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
