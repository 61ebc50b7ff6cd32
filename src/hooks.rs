//! Logging and eviction hooks.
//!
//! Operations record what happened while holding the cache lock and the
//! hooks are invoked once the lock has been released. A hook therefore
//! sees committed state, may call back into the cache, and a panicking
//! hook unwinds into the caller without poisoning the lock.
//!
//! Hook calls made by different threads are not ordered with respect to
//! each other: an eviction notice for a key can arrive after another
//! thread has already stored that key again. Callers mirroring the cache
//! contents from hooks must not rely on cross-thread ordering.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

/// Kind of an informational cache event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A fresh entry was read.
    Get,
    /// A new entry was stored.
    Put,
    /// An existing entry was overwritten.
    Update,
    /// An entry left the cache.
    Evict,
    /// The cache was emptied.
    Clear,
    /// Compute-on-miss found the key cached.
    Hit,
    /// Compute-on-miss did not find the key.
    Miss,
}

impl EventKind {
    /// Get the label used when the event is rendered.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Get => "GET",
            EventKind::Put => "PUT",
            EventKind::Update => "UPDATE",
            EventKind::Evict => "EVICT",
            EventKind::Clear => "CLEAR",
            EventKind::Hit => "HIT",
            EventKind::Miss => "MISS",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event delivered to the logging hook.
///
/// Renders as `"<KIND>: <key>"`, e.g. `"PUT: key1"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEvent {
    kind: EventKind,
    key: Option<String>,
}

impl CacheEvent {
    pub(crate) fn keyed(kind: EventKind, key: String) -> Self {
        Self {
            kind,
            key: Some(key),
        }
    }

    pub(crate) fn clear() -> Self {
        Self {
            kind: EventKind::Clear,
            key: None,
        }
    }

    /// What happened.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The affected key as text; `None` for `Clear`.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

impl fmt::Display for CacheEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}: {}", self.kind, key),
            None => write!(f, "{}: All cache entries have been removed.", self.kind),
        }
    }
}

/// Logging hook: receives every informational event.
pub type LogHook = Arc<dyn Fn(&CacheEvent) + Send + Sync>;

/// Eviction hook: receives each entry that leaves the cache.
pub type EvictHook<K, V> = Arc<dyn Fn(&K, &V) + Send + Sync>;

/// A logging hook that forwards events to `tracing` at info level.
///
/// ```
/// use lru_ttl_cache::{hooks, Cache};
///
/// let cache: Cache<&str, u32> = Cache::builder()
///     .logger(hooks::tracing_logger())
///     .build()
///     .unwrap();
/// cache.put("answer", 42);
/// ```
pub fn tracing_logger() -> impl Fn(&CacheEvent) + Send + Sync + 'static {
    |event: &CacheEvent| {
        tracing::info!(kind = %event.kind(), key = event.key(), "{}", event);
    }
}

/// Why an entry left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EvictionCause {
    /// Removed by an explicit `evict` or `evict_lru` call.
    Explicit,
    /// Dropped to make room for a new key.
    Capacity,
    /// Found stale on `get`.
    Expired,
}

impl EvictionCause {
    fn as_str(&self) -> &'static str {
        match self {
            EvictionCause::Explicit => "explicit",
            EvictionCause::Capacity => "capacity",
            EvictionCause::Expired => "expired",
        }
    }
}

/// Something a hook must be told once the lock is released.
pub(crate) enum Notice<K, V> {
    Event(CacheEvent),
    Evicted(K, V, EvictionCause),
}

/// Hooks fixed at construction.
pub(crate) struct Hooks<K, V> {
    pub(crate) logger: Option<LogHook>,
    pub(crate) on_evict: Option<EvictHook<K, V>>,
}

impl<K, V> Default for Hooks<K, V> {
    fn default() -> Self {
        Self {
            logger: None,
            on_evict: None,
        }
    }
}

impl<K, V> Clone for Hooks<K, V> {
    fn clone(&self) -> Self {
        Self {
            logger: self.logger.clone(),
            on_evict: self.on_evict.clone(),
        }
    }
}

impl<K, V> fmt::Debug for Hooks<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("logger", &self.logger.is_some())
            .field("on_evict", &self.on_evict.is_some())
            .finish()
    }
}

impl<K, V> Hooks<K, V>
where
    K: fmt::Display,
{
    /// Whether events need to be built at all.
    pub(crate) fn logs(&self) -> bool {
        self.logger.is_some()
    }

    /// Build an event for `key` if a logger is installed.
    pub(crate) fn event(&self, kind: EventKind, key: &K) -> Option<CacheEvent> {
        self.logger
            .as_ref()
            .map(|_| CacheEvent::keyed(kind, key.to_string()))
    }

    pub(crate) fn log(&self, event: &CacheEvent) {
        if let Some(logger) = &self.logger {
            logger(event);
        }
    }

    /// Report a removed entry: eviction hook first, then the `EVICT` event.
    pub(crate) fn evicted(&self, key: &K, value: &V, cause: EvictionCause) {
        debug!(key = %key, cause = cause.as_str(), "evicted cache entry");
        if let Some(on_evict) = &self.on_evict {
            on_evict(key, value);
        }
        if let Some(event) = self.event(EventKind::Evict, key) {
            self.log(&event);
        }
    }

    /// Deliver queued notices in the order they were recorded.
    pub(crate) fn dispatch(&self, notices: Vec<Notice<K, V>>) {
        for notice in notices {
            match notice {
                Notice::Event(event) => self.log(&event),
                Notice::Evicted(key, value, cause) => self.evicted(&key, &value, cause),
            }
        }
    }
}
