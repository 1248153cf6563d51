//! Cache Engine Module
//!
//! Shared state behind a `LocalCache`: buckets, ledger, router and stats.
//! The sweeper holds its own `Arc` to the engine.

use std::time::Duration;

use tokio::time::Instant;

use crate::cache::ledger::is_expired;
use crate::cache::{BucketStore, CacheStats, ExpiryLedger, HashRouter, StatsRecorder};
use crate::config::Config;

// == Cache Engine ==
#[derive(Debug)]
pub struct CacheEngine<V> {
    buckets: BucketStore<V>,
    ledger: ExpiryLedger,
    router: HashRouter,
    ttl: Duration,
    stats: StatsRecorder,
}

impl<V: Clone> CacheEngine<V> {
    // == Constructor ==
    /// Builds an empty engine. `config` must already be validated.
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            buckets: BucketStore::new(config.bucket_count),
            ledger: ExpiryLedger::new(),
            router: HashRouter::new(config.bucket_count),
            ttl: config.ttl,
            stats: StatsRecorder::new(),
        }
    }

    // == Set ==
    /// Stamps the ledger, then stores the value in the key's bucket.
    ///
    /// Stamping first means any value visible in a bucket has a ledger
    /// stamp at least as new as its write.
    pub fn set(&self, key: String, value: V) {
        let index = self.router.route(&key);
        self.ledger.stamp(&key, Instant::now());
        self.buckets.set(index, key, value);
        self.stats.record_set();
    }

    // == Get ==
    /// Reads from the key's bucket only; the ledger is not consulted or refreshed.
    pub fn get(&self, key: &str) -> Option<V> {
        let value = self.buckets.get(self.router.route(key), key);
        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        value
    }

    // == Sweep Expired ==
    /// Runs one sweep pass as of `now` and returns how many keys were evicted.
    ///
    /// Candidates are collected from a ledger scan first. Each one is then
    /// re-checked under its ledger shard lock, so a key refreshed since the
    /// scan survives the pass.
    pub fn sweep_expired(&self, now: Instant) -> usize {
        let mut candidates = Vec::new();
        self.ledger.for_each(|key, stamped| {
            if is_expired(stamped, now, self.ttl) {
                candidates.push(key.to_string());
            }
        });

        let mut evicted = 0;
        for key in candidates {
            let index = self.router.route(&key);
            let removed = self.ledger.remove_if_expired(&key, now, self.ttl, || {
                self.buckets.delete(index, &key);
            });
            if removed {
                evicted += 1;
            }
        }

        self.stats.record_sweep();
        self.stats.record_evictions(evicted as u64);
        evicted
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.buckets.len())
    }

    pub fn router(&self) -> HashRouter {
        self.router
    }

    #[cfg(test)]
    pub(crate) fn ledger(&self) -> &ExpiryLedger {
        &self.ledger
    }
}
