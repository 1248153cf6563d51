//! Cache Module
//!
//! Sharded in-memory storage with a separate expiry ledger.

mod engine;
mod ledger;
mod local;
mod router;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use engine::CacheEngine;
pub use ledger::ExpiryLedger;
pub use local::LocalCache;
pub use router::HashRouter;
pub use stats::{CacheStats, StatsRecorder};
pub use store::BucketStore;
