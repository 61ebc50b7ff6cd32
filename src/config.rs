//! Configuration for the cache.
//!
//! This module provides a builder pattern for the two fixed parameters of
//! a cache (capacity and time-to-live) and for attaching hooks.

use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::Cache;
use crate::error::{CacheError, CacheResult};
use crate::hooks::{CacheEvent, Hooks};

/// Default capacity when none is given.
pub const DEFAULT_MAX_SIZE: usize = 100;

/// Default time-to-live when none is given: five hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60 * 60);

/// Configuration for creating a new cache instance.
///
/// Use the builder pattern to construct configuration:
///
/// ```
/// use lru_ttl_cache::CacheConfig;
/// use std::time::Duration;
///
/// let config = CacheConfig::new()
///     .max_size(10_000)
///     .ttl(Duration::from_secs(300))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.get_max_size(), 10_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold.
    /// When this limit is reached, the least recently used entry is evicted.
    pub(crate) max_size: usize,

    /// How long an entry stays fresh after it was written.
    pub(crate) ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            ttl: DEFAULT_TTL,
        }
    }
}

impl CacheConfig {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of entries.
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the time-to-live for entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the time-to-live in milliseconds.
    pub fn ttl_millis(self, millis: u64) -> Self {
        self.ttl(Duration::from_millis(millis))
    }

    /// Validate and return the final configuration.
    pub fn build(self) -> CacheResult<Self> {
        self.validate()?;
        Ok(self)
    }

    /// Check that both capacity and time-to-live are positive.
    pub fn validate(&self) -> CacheResult<()> {
        if self.max_size == 0 {
            return Err(CacheError::InvalidMaxSize);
        }
        if self.ttl.is_zero() {
            return Err(CacheError::InvalidTtl);
        }
        Ok(())
    }

    /// Get the maximum number of entries.
    pub fn get_max_size(&self) -> usize {
        self.max_size
    }

    /// Get the time-to-live.
    pub fn get_ttl(&self) -> Duration {
        self.ttl
    }
}

/// Builder for a [`Cache`] with optional logging and eviction hooks.
///
/// ```
/// use lru_ttl_cache::Cache;
/// use std::time::Duration;
///
/// let cache: Cache<String, i32> = Cache::builder()
///     .max_size(3)
///     .ttl(Duration::from_millis(5000))
///     .logger(|event| println!("[LOG]: {}", event))
///     .on_evict(|key, value| println!("[EVICTED]: Key = {}, Value = {}", key, value))
///     .build()
///     .unwrap();
///
/// cache.put("key1".to_string(), 100);
/// ```
pub struct CacheBuilder<K, V> {
    config: CacheConfig,
    hooks: Hooks<K, V>,
}

impl<K, V> Default for CacheBuilder<K, V> {
    fn default() -> Self {
        Self {
            config: CacheConfig::default(),
            hooks: Hooks::default(),
        }
    }
}

impl<K, V> CacheBuilder<K, V> {
    /// Create a builder with default configuration and no hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the maximum number of entries.
    pub fn max_size(mut self, max_size: usize) -> Self {
        self.config = self.config.max_size(max_size);
        self
    }

    /// Set the time-to-live for entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.config = self.config.ttl(ttl);
        self
    }

    /// Install the logging hook.
    pub fn logger<F>(mut self, logger: F) -> Self
    where
        F: Fn(&CacheEvent) + Send + Sync + 'static,
    {
        self.hooks.logger = Some(Arc::new(logger));
        self
    }

    /// Install the eviction hook.
    pub fn on_evict<F>(mut self, on_evict: F) -> Self
    where
        F: Fn(&K, &V) + Send + Sync + 'static,
    {
        self.hooks.on_evict = Some(Arc::new(on_evict));
        self
    }
}

impl<K, V> CacheBuilder<K, V>
where
    K: Hash + Eq + Clone + Display,
    V: Clone,
{
    /// Validate the configuration and create the cache.
    pub fn build(self) -> CacheResult<Cache<K, V>> {
        Cache::with_hooks(self.config, self.hooks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.max_size, 100);
        assert_eq!(config.ttl, Duration::from_millis(1000 * 60 * 60 * 5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = CacheConfig::new()
            .max_size(1000)
            .ttl(Duration::from_secs(60))
            .build()
            .unwrap();

        assert_eq!(config.get_max_size(), 1000);
        assert_eq!(config.get_ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_ttl_millis() {
        let config = CacheConfig::new().ttl_millis(5000);
        assert_eq!(config.get_ttl(), Duration::from_secs(5));
    }

    #[test]
    fn test_zero_max_size_rejected() {
        let result = CacheConfig::new().max_size(0).build();
        assert_eq!(result, Err(CacheError::InvalidMaxSize));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let result = CacheConfig::new().ttl(Duration::ZERO).build();
        assert_eq!(result, Err(CacheError::InvalidTtl));
    }

    #[test]
    fn test_cache_builder_rejects_invalid_config() {
        let result = CacheBuilder::<String, i32>::new().max_size(0).build();
        assert!(matches!(result, Err(CacheError::InvalidMaxSize)));

        let result = CacheBuilder::<String, i32>::new()
            .ttl(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(CacheError::InvalidTtl)));
    }
}
