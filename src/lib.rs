//! # LRU/TTL Cache
//!
//! A generic, thread-safe, bounded in-process cache for Rust combining
//! least-recently-used eviction with time-to-live expiry.
//!
//! ## Features
//!
//! - **Thread-safe**: Share across threads with `Clone` (uses `Arc` internally)
//! - **LRU eviction**: Inserting into a full cache evicts the least recently used entry
//! - **TTL expiry**: Entries older than the TTL are dropped when next read
//! - **Hooks**: Optional logging and eviction callbacks
//! - **Compute-on-miss**: Memoize expensive computations with `with_cache`
//! - **Statistics**: Track hits, misses, evictions, and more
//!
//! ## Quick Start
//!
//! ```rust
//! use lru_ttl_cache::Cache;
//! use std::time::Duration;
//!
//! let cache: Cache<String, i32> = Cache::builder()
//!     .max_size(3)
//!     .ttl(Duration::from_millis(5000))
//!     .logger(|event| println!("[LOG]: {}", event))
//!     .on_evict(|key, value| println!("[EVICTED]: Key = {}, Value = {}", key, value))
//!     .build()
//!     .unwrap();
//!
//! cache.put("key1".to_string(), 100);
//! cache.put("key2".to_string(), 200);
//! cache.put("key3".to_string(), 300);
//! cache.put("key4".to_string(), 400); // evicts key1
//!
//! assert!(cache.get("key1").is_none());
//! assert_eq!(cache.get("key4"), Some(400));
//!
//! // Compute on miss, reuse on hit
//! assert_eq!(cache.with_cache("key5".to_string(), || Some(500)), Some(500));
//! assert_eq!(cache.with_cache("key5".to_string(), || Some(999)), Some(500));
//! ```
//!
//! ## Thread Safety
//!
//! The cache is safe to share across threads. Cloning a `Cache` creates a new
//! handle to the same underlying data:
//!
//! ```rust
//! use lru_ttl_cache::Cache;
//! use std::thread;
//! use std::time::Duration;
//!
//! let cache: Cache<String, String> = Cache::new(100, Duration::from_secs(60)).unwrap();
//!
//! let handles: Vec<_> = (0..4).map(|i| {
//!     let cache = cache.clone();
//!     thread::spawn(move || {
//!         cache.put(format!("key_{}", i), format!("value_{}", i));
//!     })
//! }).collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! assert_eq!(cache.len(), 4);
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod hooks;
pub mod stats;

pub use cache::Cache;
pub use config::{CacheBuilder, CacheConfig};
pub use error::{CacheError, CacheResult};
pub use hooks::{CacheEvent, EventKind, EvictHook, LogHook};
pub use stats::{CacheStats, StatsSnapshot};

// Internal modules - not part of public API
pub(crate) mod entry;
pub(crate) mod flight;
pub(crate) mod storage;
