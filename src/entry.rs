//! Cache entry with the timestamp used for TTL expiry.

use std::time::{Duration, Instant};

/// A single cache entry: the stored value and when it was last written.
///
/// Entries are replaced, never mutated in place, when a key is updated.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value.
    pub(crate) value: V,

    /// When this entry was inserted or last refreshed by a `put`.
    pub(crate) created_or_refreshed_at: Instant,
}

impl<V> CacheEntry<V> {
    /// Create an entry stamped with `now`.
    pub fn new_at(value: V, now: Instant) -> Self {
        Self {
            value,
            created_or_refreshed_at: now,
        }
    }

    /// Check if this entry has outlived `ttl` as of `now`.
    ///
    /// An entry exactly `ttl` old is still fresh.
    pub fn is_expired_at(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_or_refreshed_at) > ttl
    }

    /// Consume the entry, returning its value.
    pub fn into_value(self) -> V {
        self.value
    }
}
