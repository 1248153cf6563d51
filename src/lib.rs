//! Local Cache - A sharded in-process key/value cache
//!
//! Values live in a fixed set of independently locked buckets; a separate
//! expiry ledger records when each key was last written, and a background
//! sweeper evicts keys older than the configured TTL.
//!
//! ```ignore
//! use std::time::Duration;
//! use local_cache::LocalCache;
//!
//! let cache = LocalCache::with_ttl(Duration::from_secs(30 * 60))?;
//! cache.set("user:42", profile);
//! let hit = cache.get("user:42");
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod global;
pub mod tasks;

pub use cache::{CacheStats, LocalCache};
pub use config::Config;
pub use error::{CacheError, Result};
pub use global::{get_cache, AnyValue};
