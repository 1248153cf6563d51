//! Process-wide Cache
//!
//! Lazily built singleton for callers that want one shared cache without
//! threading a handle through their code.

use std::any::Any;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tracing::{error, info};

use crate::cache::LocalCache;
use crate::config::Config;

/// Type-erased value stored in the process-wide cache.
pub type AnyValue = Arc<dyn Any + Send + Sync>;

static GLOBAL_CACHE: OnceLock<LocalCache<AnyValue>> = OnceLock::new();

/// Returns the process-wide cache, building it on the first call.
///
/// Only the first caller's `ttl` is used; later calls get the same
/// instance and their `ttl` is ignored. The sweeper runs on its own thread
/// and default bucket count and sweep interval apply.
pub fn get_cache(ttl: Duration) -> &'static LocalCache<AnyValue> {
    GLOBAL_CACHE.get_or_init(|| build_global(Config::default().with_ttl(ttl)))
}

fn build_global(config: Config) -> LocalCache<AnyValue> {
    info!("Initializing process-wide cache with ttl {:?}", config.ttl);

    match LocalCache::new(config.clone()) {
        Ok(cache) => cache,
        Err(err) => {
            error!("{}; process-wide cache will not expire entries", err);
            LocalCache::without_sweeper(config)
        }
    }
}

impl LocalCache<AnyValue> {
    /// Stores any `Send + Sync` value, boxing it behind an `Arc`.
    pub fn set_value<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        self.set(key, Arc::new(value));
    }

    /// Returns the value for `key` if present and of type `T`.
    pub fn get_as<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.get(key)?.downcast::<T>().ok()
    }
}
