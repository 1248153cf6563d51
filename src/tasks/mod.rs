//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a cache.
//!
//! # Tasks
//! - Expiry Sweeper: evicts entries older than the TTL at a fixed interval

mod sweeper;

pub use sweeper::{spawn_dedicated_sweeper, spawn_sweeper, SweeperHandle, SWEEPER_THREAD_NAME};
