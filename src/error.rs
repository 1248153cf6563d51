//! Error types for the local cache
//!
//! Provides unified error handling using thiserror. Reads and writes never
//! fail; errors only come from construction.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the local cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Configuration rejected by `Config::validate`
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The background sweeper could not be started
    #[error("Sweeper error: {0}")]
    Sweeper(String),
}

// == Result Type Alias ==
/// Convenience Result type for the local cache.
pub type Result<T> = std::result::Result<T, CacheError>;
