//! Error types for the cache library.
//!
//! Only construction can fail. Looking up an absent or expired key is
//! not an error; those cases surface as `None`.

use thiserror::Error;

/// The error type returned when a cache cannot be constructed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The configured capacity was zero.
    #[error("max_size must be greater than zero")]
    InvalidMaxSize,

    /// The configured time-to-live was zero.
    #[error("ttl must be greater than zero")]
    InvalidTtl,
}

/// A specialized Result type for cache construction.
pub type CacheResult<T> = Result<T, CacheError>;
