//! The main cache interface.
//!
//! This module provides the primary `Cache` type that users interact with.
//! It wraps the internal storage in a read-write lock, counts operations,
//! and delivers hook notifications once the lock has been released.

use std::borrow::Borrow;
use std::fmt::{self, Display};
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::config::{CacheBuilder, CacheConfig};
use crate::error::CacheResult;
use crate::flight::InFlight;
use crate::hooks::{CacheEvent, EventKind, EvictionCause, Hooks, Notice};
use crate::stats::{CacheStats, StatsSnapshot};
use crate::storage::{Insertion, Lookup, Store};

/// A thread-safe, bounded cache with LRU eviction and TTL expiry.
///
/// # Features
/// - **Thread-safe**: Can be shared across threads by cloning the handle.
/// - **LRU eviction**: When full, inserting a new key evicts the least recently used entry.
/// - **TTL expiry**: Entries older than the TTL are treated as absent. Expiry is
///   checked lazily on `get`; there is no background sweep.
/// - **Hooks**: An optional logger and an optional eviction callback.
/// - **Compute-on-miss**: `with_cache` memoizes expensive computations.
///
/// # Example
/// ```
/// use lru_ttl_cache::Cache;
/// use std::time::Duration;
///
/// let cache: Cache<String, i32> = Cache::new(3, Duration::from_millis(5000)).unwrap();
///
/// cache.put("key1".to_string(), 100);
/// cache.put("key2".to_string(), 200);
/// assert_eq!(cache.get("key1"), Some(100));
///
/// let value = cache.with_cache("key5".to_string(), || Some(500));
/// assert_eq!(value, Some(500));
/// ```
pub struct Cache<K, V> {
    inner: Arc<Inner<K, V>>,
}

struct Inner<K, V> {
    /// Entries and recency order, protected by a read-write lock.
    store: RwLock<Store<K, V>>,

    /// Configuration this cache was created with.
    config: CacheConfig,

    hooks: Hooks<K, V>,

    /// Statistics for cache operations.
    stats: CacheStats,

    /// Keys with a single-flight computation running.
    flights: InFlight<K>,
}

impl<K, V> Clone for Cache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Cache<K, V>
where
    K: Hash + Eq + Clone + Display,
    V: Clone,
{
    /// Create a cache without hooks.
    ///
    /// Fails if `max_size` is zero or `ttl` is zero.
    ///
    /// # Example
    /// ```
    /// use lru_ttl_cache::{Cache, CacheError};
    /// use std::time::Duration;
    ///
    /// let cache = Cache::<String, i32>::new(0, Duration::from_secs(1));
    /// assert_eq!(cache.unwrap_err(), CacheError::InvalidMaxSize);
    /// ```
    pub fn new(max_size: usize, ttl: Duration) -> CacheResult<Self> {
        Self::from_config(CacheConfig::new().max_size(max_size).ttl(ttl))
    }

    /// Create a cache without hooks from a configuration.
    pub fn from_config(config: CacheConfig) -> CacheResult<Self> {
        Self::with_hooks(config, Hooks::default())
    }

    /// Start building a cache with hooks.
    pub fn builder() -> CacheBuilder<K, V> {
        CacheBuilder::new()
    }

    pub(crate) fn with_hooks(config: CacheConfig, hooks: Hooks<K, V>) -> CacheResult<Self> {
        config.validate()?;
        debug!(
            max_size = config.max_size,
            ttl_ms = config.ttl.as_millis() as u64,
            ?hooks,
            "created cache"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                store: RwLock::new(Store::new(config.max_size, config.ttl)),
                config,
                hooks,
                stats: CacheStats::new(),
                flights: InFlight::default(),
            }),
        })
    }

    /// Check if a key is stored.
    ///
    /// Expiry is not applied and recency is not changed, so an expired
    /// entry that has not been read yet still counts as present.
    /// Concurrent `contains` calls share the lock.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.read_lock().contains(key)
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key is absent. An expired entry is evicted
    /// (firing the eviction hook) and `None` is returned. A fresh entry
    /// becomes the most recently used.
    ///
    /// # Example
    /// ```
    /// use lru_ttl_cache::Cache;
    /// use std::time::Duration;
    ///
    /// let cache = Cache::new(10, Duration::from_secs(60)).unwrap();
    /// cache.put("key", "value");
    ///
    /// match cache.get("key") {
    ///     Some(value) => println!("Found: {}", value),
    ///     None => println!("Not found"),
    /// }
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let mut notices = Vec::new();

        let value = {
            let mut store = self.write_lock();
            let lookup = store.get(key, Instant::now());
            match lookup {
                Lookup::Hit(stored, value) => {
                    self.inner.stats.record_hit();
                    trace!(key = %stored, "cache hit");
                    if let Some(event) = self.inner.hooks.event(EventKind::Get, stored) {
                        notices.push(Notice::Event(event));
                    }
                    Some(value.clone())
                }
                Lookup::Expired(stored, value) => {
                    self.inner.stats.record_miss();
                    self.inner.stats.record_expiration();
                    notices.push(Notice::Evicted(stored, value, EvictionCause::Expired));
                    None
                }
                Lookup::Miss => {
                    self.inner.stats.record_miss();
                    trace!("cache miss");
                    None
                }
            }
        };

        self.inner.hooks.dispatch(notices);
        value
    }

    /// Insert or update a value, returning the previous value if any.
    ///
    /// Updating refreshes the entry's timestamp. Inserting a new key into
    /// a full cache first evicts the least recently used entry.
    ///
    /// # Example
    /// ```
    /// use lru_ttl_cache::Cache;
    /// use std::time::Duration;
    ///
    /// let cache = Cache::new(10, Duration::from_secs(60)).unwrap();
    /// assert_eq!(cache.put("key", 1), None);
    /// assert_eq!(cache.put("key", 2), Some(1));
    /// ```
    pub fn put(&self, key: K, value: V) -> Option<V> {
        trace!(key = %key, "cache put");
        let key_text = self.inner.hooks.logs().then(|| key.to_string());
        let mut notices = Vec::new();

        let previous = {
            let mut store = self.write_lock();
            match store.insert(key, value, Instant::now()) {
                Insertion::Updated(old) => {
                    self.inner.stats.record_update();
                    if let Some(text) = key_text {
                        notices.push(Notice::Event(CacheEvent::keyed(EventKind::Update, text)));
                    }
                    Some(old)
                }
                Insertion::Inserted { evicted } => {
                    self.inner.stats.record_insert();
                    if let Some((victim, value)) = evicted {
                        self.inner.stats.record_eviction();
                        notices.push(Notice::Evicted(victim, value, EvictionCause::Capacity));
                    }
                    if let Some(text) = key_text {
                        notices.push(Notice::Event(CacheEvent::keyed(EventKind::Put, text)));
                    }
                    None
                }
            }
        };

        self.inner.hooks.dispatch(notices);
        previous
    }

    /// Remove a key regardless of expiry, returning its value.
    ///
    /// Fires the eviction hook when something was removed. Evicting an
    /// absent key returns `None` and fires nothing.
    pub fn evict<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let removed = self.write_lock().remove(key);
        self.retire(removed)
    }

    /// Remove the least recently used entry, returning its value.
    ///
    /// Returns `None` if the cache is empty.
    pub fn evict_lru(&self) -> Option<V> {
        let removed = self.write_lock().pop_lru();
        self.retire(removed)
    }

    /// Return the cached value for `key`, or compute, store and return it.
    ///
    /// If `compute` yields `None`, nothing is stored. The lookup and the
    /// store are separate locked steps: concurrent callers missing on the
    /// same key may each run `compute`. Use
    /// [`with_cache_single_flight`](Self::with_cache_single_flight) to run
    /// it once.
    ///
    /// # Example
    /// ```
    /// use lru_ttl_cache::Cache;
    /// use std::time::Duration;
    ///
    /// let cache = Cache::new(10, Duration::from_secs(60)).unwrap();
    /// assert_eq!(cache.with_cache("key5", || Some(500)), Some(500));
    /// // Already cached: the closure is not called.
    /// assert_eq!(cache.with_cache("key5", || Some(999)), Some(500));
    /// ```
    pub fn with_cache<F>(&self, key: K, compute: F) -> Option<V>
    where
        F: FnOnce() -> Option<V>,
    {
        if let Some(value) = self.cached(&key) {
            return Some(value);
        }
        self.compute_and_store(key, compute)
    }

    /// Like [`with_cache`](Self::with_cache) for a fallible computation.
    ///
    /// An error from `compute` is returned unchanged and nothing is stored.
    pub fn try_with_cache<F, E>(&self, key: K, compute: F) -> Result<Option<V>, E>
    where
        F: FnOnce() -> Result<Option<V>, E>,
    {
        if let Some(value) = self.cached(&key) {
            return Ok(Some(value));
        }
        self.log_keyed(EventKind::Miss, &key);
        self.inner.stats.record_compute();

        let Some(value) = compute()? else {
            return Ok(None);
        };
        self.put(key, value.clone());
        Ok(Some(value))
    }

    /// Like [`with_cache`](Self::with_cache), but concurrent misses on the
    /// same key wait for one computation instead of each running `compute`.
    ///
    /// A waiting caller looks in the cache again once the running
    /// computation finishes, and only computes itself if the value is
    /// still absent (the other computation yielded `None` or panicked).
    pub fn with_cache_single_flight<F>(&self, key: K, compute: F) -> Option<V>
    where
        F: FnOnce() -> Option<V>,
    {
        if let Some(value) = self.cached(&key) {
            return Some(value);
        }

        let _flight = self.inner.flights.enter(&key);
        if let Some(value) = self.cached(&key) {
            return Some(value);
        }
        self.compute_and_store(key, compute)
    }

    /// Remove every entry.
    ///
    /// The eviction hook is not fired for the removed entries.
    pub fn clear(&self) {
        let dropped = {
            let mut store = self.write_lock();
            let dropped = store.len();
            store.clear();
            dropped
        };

        self.inner.stats.record_clear();
        debug!(dropped, "cleared cache");
        self.inner.hooks.log(&CacheEvent::clear());
    }

    /// Get the number of entries in the cache.
    ///
    /// Note: This includes expired entries that have not been read since
    /// they expired.
    pub fn len(&self) -> usize {
        self.read_lock().len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys currently stored, from least to most recently used.
    ///
    /// Like `contains`, this ignores expiry and does not change recency.
    pub fn keys(&self) -> Vec<K> {
        self.read_lock()
            .keys_by_recency()
            .into_iter()
            .cloned()
            .collect()
    }

    /// Get the capacity this cache was created with.
    pub fn max_size(&self) -> usize {
        self.inner.config.max_size
    }

    /// Get the time-to-live this cache was created with.
    pub fn ttl(&self) -> Duration {
        self.inner.config.ttl
    }

    /// Get a snapshot of the cache statistics.
    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot(self.len())
    }

    // Private helper methods

    /// Acquire the lock in shared mode.
    ///
    /// Hooks never run under the lock, so poisoning can only come from a
    /// panicking `Hash`/`Eq`/`Clone` impl; the store is used as-is then.
    fn read_lock(&self) -> RwLockReadGuard<'_, Store<K, V>> {
        self.inner
            .store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquire the lock in exclusive mode.
    fn write_lock(&self) -> RwLockWriteGuard<'_, Store<K, V>> {
        self.inner
            .store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Report an explicitly removed entry and hand back its value.
    fn retire(&self, removed: Option<(K, V)>) -> Option<V> {
        let (key, value) = removed?;
        self.inner.stats.record_removal();
        self.inner
            .hooks
            .evicted(&key, &value, EvictionCause::Explicit);
        Some(value)
    }

    /// `get` for the compute-on-miss paths, logging a hit.
    fn cached(&self, key: &K) -> Option<V> {
        let value = self.get(key)?;
        self.log_keyed(EventKind::Hit, key);
        Some(value)
    }

    fn compute_and_store<F>(&self, key: K, compute: F) -> Option<V>
    where
        F: FnOnce() -> Option<V>,
    {
        self.log_keyed(EventKind::Miss, &key);
        self.inner.stats.record_compute();

        let value = compute()?;
        self.put(key, value.clone());
        Some(value)
    }

    fn log_keyed(&self, kind: EventKind, key: &K) {
        if let Some(event) = self.inner.hooks.event(kind, key) {
            self.inner.hooks.log(&event);
        }
    }
}

impl<K, V> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("max_size", &self.inner.config.max_size)
            .field("ttl", &self.inner.config.ttl)
            .field("hooks", &self.inner.hooks)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::thread;

    fn cache(max_size: usize) -> Cache<String, i32> {
        Cache::new(max_size, Duration::from_secs(60)).unwrap()
    }

    #[test]
    fn test_cache_basic_operations() {
        let cache = cache(10);

        assert_eq!(cache.put("key".to_string(), 1), None);
        assert_eq!(cache.get("key"), Some(1));
        assert!(cache.contains("key"));

        assert_eq!(cache.evict("key"), Some(1));
        assert!(!cache.contains("key"));
        assert_eq!(cache.evict("key"), None);
    }

    #[test]
    fn test_cache_is_clone() {
        let cache1 = cache(10);
        cache1.put("key".to_string(), 1);

        let cache2 = cache1.clone();

        // Both point to the same underlying data
        assert_eq!(cache2.get("key"), Some(1));

        cache2.put("key2".to_string(), 2);
        assert_eq!(cache1.get("key2"), Some(2));
    }

    #[test]
    fn test_invalid_construction() {
        assert!(Cache::<String, i32>::new(0, Duration::from_secs(1)).is_err());
        assert!(Cache::<String, i32>::new(1, Duration::ZERO).is_err());
    }

    #[test]
    fn test_evict_lru_order_and_empty() {
        let cache = cache(10);
        assert_eq!(cache.evict_lru(), None);

        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);
        let _ = cache.get("a");

        assert_eq!(cache.evict_lru(), Some(2));
        assert_eq!(cache.keys(), vec!["a".to_string()]);
    }

    #[test]
    fn test_cache_stats() {
        let cache = cache(2);

        cache.put("a".to_string(), 1);
        cache.put("a".to_string(), 2);
        cache.put("b".to_string(), 3);
        cache.put("c".to_string(), 4);
        let _ = cache.get("c");
        let _ = cache.get("missing");
        cache.evict("b");

        let stats = cache.stats();
        assert_eq!(stats.inserts, 3);
        assert_eq!(stats.updates, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.removals, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn test_put_logs_eviction_before_put() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);

        let cache: Cache<String, i32> = Cache::builder()
            .max_size(1)
            .logger(move |event| sink.lock().unwrap().push(event.to_string()))
            .build()
            .unwrap();

        cache.put("a".to_string(), 1);
        cache.put("a".to_string(), 2);
        cache.put("b".to_string(), 3);
        let _ = cache.get("b");
        cache.clear();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "PUT: a",
                "UPDATE: a",
                "EVICT: a",
                "PUT: b",
                "GET: b",
                "CLEAR: All cache entries have been removed.",
            ]
        );
    }

    #[test]
    fn test_hook_can_reenter_cache() {
        let slot: Arc<Mutex<Option<Cache<String, i32>>>> = Arc::new(Mutex::new(None));
        let hook_slot = Arc::clone(&slot);

        let cache: Cache<String, i32> = Cache::builder()
            .max_size(1)
            .on_evict(move |key: &String, _value: &i32| {
                if let Some(cache) = hook_slot.lock().unwrap().as_ref() {
                    // Runs after the lock is released, so this does not deadlock.
                    assert!(!cache.contains(key.as_str()));
                    let _ = cache.len();
                }
            })
            .build()
            .unwrap();
        *slot.lock().unwrap() = Some(cache.clone());

        cache.put("a".to_string(), 1);
        cache.put("b".to_string(), 2);
        assert_eq!(cache.keys(), vec!["b".to_string()]);

        // Break the Arc cycle between the cache and its own hook.
        slot.lock().unwrap().take();
    }

    #[test]
    fn test_cache_thread_safety() {
        let cache = cache(50);
        let mut handles = vec![];

        // Spawn multiple threads that read/write concurrently
        for i in 0..10 {
            let cache = cache.clone();
            let handle = thread::spawn(move || {
                for j in 0..100 {
                    let key = format!("key_{}", j);
                    cache.put(key.clone(), i * 1000 + j);
                    let _ = cache.get(&key);
                    assert!(cache.len() <= 50);
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 50);
        cache.read_lock().check_invariants();
    }

    #[test]
    fn test_single_flight_gate_is_released() {
        let cache = cache(10);
        assert_eq!(
            cache.with_cache_single_flight("k".to_string(), || Some(1)),
            Some(1)
        );
        assert_eq!(
            cache.with_cache_single_flight("n".to_string(), || None),
            None
        );
        assert_eq!(cache.inner.flights.len(), 0);
    }
}
