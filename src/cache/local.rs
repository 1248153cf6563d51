//! Local Cache Module
//!
//! Public facade tying the engine to its background sweeper.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::Instant;

use crate::cache::{CacheEngine, CacheStats};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_dedicated_sweeper, spawn_sweeper, SweeperHandle};

// == Local Cache ==
/// Sharded in-process cache with coarse TTL expiration.
///
/// Entries are evicted by a background sweeper that runs every
/// `sweep_interval`, so an entry may stay readable for up to one interval
/// past its TTL. Reads never extend an entry's lifetime; only `set` does.
///
/// The sweeper stops when the cache is dropped or `shutdown` is called.
pub struct LocalCache<V> {
    engine: Arc<CacheEngine<V>>,
    config: Config,
    sweeper: Option<SweeperHandle>,
}

impl<V> LocalCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates a cache and starts its sweeper on a dedicated thread.
    ///
    /// The sweeper does not depend on any runtime the caller may be inside,
    /// so it keeps running until `shutdown`, drop, or process exit.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let engine = Arc::new(CacheEngine::new(&config));
        let sweeper = spawn_dedicated_sweeper(config.sweep_interval, sweep_pass(&engine))?;

        Ok(Self {
            engine,
            config,
            sweeper: Some(sweeper),
        })
    }

    /// Creates a cache whose sweeper is a task on the current tokio runtime.
    ///
    /// The sweeper lives only as long as that runtime: once the runtime shuts
    /// down, nothing is evicted anymore. The runtime must have its timer
    /// enabled. Each pass runs synchronously on a runtime worker, so a large
    /// ledger stalls other tasks on that worker for the length of the scan.
    ///
    /// Fails with `CacheError::Sweeper` when called outside a runtime.
    pub fn new_in_runtime(config: Config) -> Result<Self> {
        config.validate()?;
        if Handle::try_current().is_err() {
            return Err(CacheError::Sweeper(
                "new_in_runtime called outside a tokio runtime".to_string(),
            ));
        }
        let engine = Arc::new(CacheEngine::new(&config));
        let sweeper = spawn_sweeper(config.sweep_interval, sweep_pass(&engine));

        Ok(Self {
            engine,
            config,
            sweeper: Some(sweeper),
        })
    }

    /// Creates a cache with the given TTL and default bucket count and sweep interval.
    pub fn with_ttl(ttl: Duration) -> Result<Self> {
        Self::new(Config::default().with_ttl(ttl))
    }

    /// Builds a cache with no background sweeper. Expiry then only happens
    /// through `purge_expired`. `config` must already be valid.
    pub(crate) fn without_sweeper(config: Config) -> Self {
        Self {
            engine: Arc::new(CacheEngine::new(&config)),
            config,
            sweeper: None,
        }
    }

    // == Set ==
    /// Stores `value` under `key`, overwriting any previous value and
    /// restarting the key's TTL.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.engine.set(key.into(), value);
    }

    // == Get ==
    /// Returns the value for `key`, or `None` if it was never set or has
    /// already been evicted.
    pub fn get(&self, key: &str) -> Option<V> {
        self.engine.get(key)
    }

    // == Purge Expired ==
    /// Runs one sweep pass immediately and returns the number of evicted keys.
    pub fn purge_expired(&self) -> usize {
        self.engine.sweep_expired(Instant::now())
    }

    // == Shutdown ==
    /// Stops the background sweeper. Stored entries stay readable.
    pub fn shutdown(&self) {
        if let Some(sweeper) = &self.sweeper {
            sweeper.stop();
        }
    }

    /// Returns true while the background sweeper loop is alive.
    pub fn is_sweeping(&self) -> bool {
        self.sweeper
            .as_ref()
            .is_some_and(|sweeper| !sweeper.is_finished())
    }

    pub fn ttl(&self) -> Duration {
        self.engine.ttl()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Bucket index `key` routes to.
    pub fn bucket_of(&self, key: &str) -> usize {
        self.engine.router().route(key)
    }

    pub fn len(&self) -> usize {
        self.engine.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engine.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.engine.stats()
    }
}

impl<V> fmt::Debug for LocalCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalCache")
            .field("config", &self.config)
            .field("sweeper", &self.sweeper)
            .finish_non_exhaustive()
    }
}

fn sweep_pass<V>(engine: &Arc<CacheEngine<V>>) -> impl Fn() -> usize + Send + 'static
where
    V: Clone + Send + Sync + 'static,
{
    let engine = Arc::clone(engine);
    move || engine.sweep_expired(Instant::now())
}
