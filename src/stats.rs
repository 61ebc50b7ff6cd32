//! Statistics and metrics for the cache.
//!
//! This module provides atomic counters for tracking cache operations,
//! enabling observability without taking the cache lock.

use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics for cache operations.
///
/// All counters are atomic and can be safely accessed from multiple threads.
/// Use `Cache::stats()` to get a snapshot of the current statistics.
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Number of `get` calls that found a fresh entry.
    hits: AtomicU64,

    /// Number of `get` calls that found nothing or an expired entry.
    misses: AtomicU64,

    /// Number of new keys stored.
    inserts: AtomicU64,

    /// Number of existing keys overwritten.
    updates: AtomicU64,

    /// Number of entries evicted due to capacity limits.
    evictions: AtomicU64,

    /// Number of entries removed because they were found expired.
    expirations: AtomicU64,

    /// Number of entries removed by explicit `evict` / `evict_lru`.
    removals: AtomicU64,

    /// Number of `clear` calls.
    clears: AtomicU64,

    /// Number of times a compute-on-miss closure was invoked.
    computes: AtomicU64,
}

impl CacheStats {
    /// Create a new stats instance with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cache hit.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache miss.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a new key.
    pub fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an overwrite.
    pub fn record_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an eviction (due to capacity).
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an expiration (due to TTL).
    pub fn record_expiration(&self) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an explicit removal.
    pub fn record_removal(&self) {
        self.removals.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a clear.
    pub fn record_clear(&self) {
        self.clears.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a compute-on-miss invocation.
    pub fn record_compute(&self) {
        self.computes.fetch_add(1, Ordering::Relaxed);
    }

    // Getters for reading statistics

    /// Get the number of cache hits.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Get the number of cache misses.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Get the number of new keys stored.
    pub fn inserts(&self) -> u64 {
        self.inserts.load(Ordering::Relaxed)
    }

    /// Get the number of overwrites.
    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }

    /// Get the number of capacity evictions.
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Get the number of expirations.
    pub fn expirations(&self) -> u64 {
        self.expirations.load(Ordering::Relaxed)
    }

    /// Get the number of explicit removals.
    pub fn removals(&self) -> u64 {
        self.removals.load(Ordering::Relaxed)
    }

    /// Get the number of clears.
    pub fn clears(&self) -> u64 {
        self.clears.load(Ordering::Relaxed)
    }

    /// Get the number of compute-on-miss invocations.
    pub fn computes(&self) -> u64 {
        self.computes.load(Ordering::Relaxed)
    }

    /// Calculate the hit rate as a percentage (0.0 to 100.0).
    /// Returns 0.0 if no lookups have been performed.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let misses = self.misses();
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }

    /// Create a snapshot of the counters together with the current size.
    pub fn snapshot(&self, size: usize) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits(),
            misses: self.misses(),
            inserts: self.inserts(),
            updates: self.updates(),
            evictions: self.evictions(),
            expirations: self.expirations(),
            removals: self.removals(),
            clears: self.clears(),
            computes: self.computes(),
            size,
            hit_rate: self.hit_rate(),
        }
    }
}

/// A point-in-time snapshot of cache statistics.
///
/// Unlike `CacheStats`, this struct contains plain values (not atomics)
/// and can be easily logged or compared.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub updates: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub removals: u64,
    pub clears: u64,
    pub computes: u64,
    pub size: usize,
    pub hit_rate: f64,
}
