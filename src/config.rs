//! Configuration Module
//!
//! Handles loading and validating cache configuration.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::error::{CacheError, Result};

/// Default time-to-live for entries (30 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Default number of buckets
pub const DEFAULT_BUCKET_COUNT: usize = 1 << 8;

/// Default pause between sweep passes (2 minutes)
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(2 * 60);

/// Cache configuration parameters.
///
/// All values are fixed once a cache is constructed from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Age after which an entry becomes eligible for eviction
    pub ttl: Duration,
    /// Number of independently locked buckets (power of two)
    pub bucket_count: usize,
    /// Pause between two sweep passes
    pub sweep_interval: Duration,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `LOCAL_CACHE_TTL_SECS` - Entry TTL in seconds (default: 1800)
    /// - `LOCAL_CACHE_BUCKETS` - Bucket count (default: 256)
    /// - `LOCAL_CACHE_SWEEP_INTERVAL_SECS` - Sweep period in seconds (default: 120)
    ///
    /// Unparsable values fall back to the default with a warning.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ttl: env_var("LOCAL_CACHE_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.ttl),
            bucket_count: env_var("LOCAL_CACHE_BUCKETS").unwrap_or(defaults.bucket_count),
            sweep_interval: env_var("LOCAL_CACHE_SWEEP_INTERVAL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_interval),
        }
    }

    /// Returns a copy with the given TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Returns a copy with the given bucket count.
    pub fn with_bucket_count(mut self, bucket_count: usize) -> Self {
        self.bucket_count = bucket_count;
        self
    }

    /// Returns a copy with the given sweep interval.
    pub fn with_sweep_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }

    /// Checks that the bucket count is a non-zero power of two and that the
    /// sweep interval is non-zero. A zero TTL is allowed: every entry is then
    /// evicted on the next pass.
    pub fn validate(&self) -> Result<()> {
        if !self.bucket_count.is_power_of_two() {
            return Err(CacheError::InvalidConfig(format!(
                "bucket_count must be a non-zero power of two, got {}",
                self.bucket_count
            )));
        }

        if self.sweep_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "sweep_interval must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            bucket_count: DEFAULT_BUCKET_COUNT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

fn env_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparsable {}={:?}, using default", name, raw);
            None
        }
    }
}
