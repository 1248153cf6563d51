//! Expiry Ledger Module
//!
//! Tracks when each key was last written, separately from the buckets.

use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

// == Expiry Ledger ==
/// Concurrent map from key to the instant of its most recent `set`.
///
/// Iteration is weakly consistent: stamps and deletes that race with a
/// `for_each` may or may not be observed.
#[derive(Debug, Default)]
pub struct ExpiryLedger {
    stamps: DashMap<String, Instant>,
}

impl ExpiryLedger {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Stamp ==
    /// Records `now` as the last write time of `key`, replacing any earlier stamp.
    pub fn stamp(&self, key: &str, now: Instant) {
        match self.stamps.get_mut(key) {
            Some(mut stamped) => *stamped = now,
            None => {
                self.stamps.insert(key.to_string(), now);
            }
        }
    }

    /// Returns the last write time of `key`.
    pub fn stamped_at(&self, key: &str) -> Option<Instant> {
        self.stamps.get(key).map(|stamped| *stamped)
    }

    // == For Each ==
    /// Visits every `(key, stamp)` pair currently in the ledger.
    ///
    /// `visit` must not call back into the ledger; it runs while a shard
    /// read lock is held.
    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(&str, Instant),
    {
        for entry in self.stamps.iter() {
            visit(entry.key(), *entry.value());
        }
    }

    // == Delete ==
    /// Removes the stamp for `key`, if present.
    pub fn delete(&self, key: &str) -> bool {
        self.stamps.remove(key).is_some()
    }

    // == Remove If Expired ==
    /// Removes `key` only if its stamp is older than `ttl` at `now`, running
    /// `on_evict` while the key's shard is still locked.
    ///
    /// A concurrent `stamp` on the same key waits for this call, so a key
    /// refreshed before the check is never evicted and a refresh after it
    /// re-creates the stamp.
    pub fn remove_if_expired<F>(&self, key: &str, now: Instant, ttl: Duration, on_evict: F) -> bool
    where
        F: FnOnce(),
    {
        self.stamps
            .remove_if(key, |_, stamped| {
                if is_expired(*stamped, now, ttl) {
                    on_evict();
                    true
                } else {
                    false
                }
            })
            .is_some()
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }
}

/// True once strictly more than `ttl` has passed between `stamped` and `now`.
pub fn is_expired(stamped: Instant, now: Instant, ttl: Duration) -> bool {
    now.saturating_duration_since(stamped) > ttl
}
