//! Command-line interface definitions.
//!
//! This module defines the arguments of the `demo` binary using clap.

use clap::Parser;
use std::time::Duration;

use crate::config::CacheConfig;

/// Walk through puts, gets, LRU eviction, TTL expiry and compute-on-miss.
#[derive(Parser, Debug)]
#[command(name = "demo")]
#[command(author, version, about, long_about = None)]
pub struct DemoArgs {
    /// Maximum number of entries before the least recently used is evicted.
    #[arg(long, default_value_t = 3)]
    pub max_size: usize,

    /// Time-to-live of each entry, in milliseconds.
    #[arg(long, default_value_t = 5000)]
    pub ttl_ms: u64,

    /// How long to sleep before re-reading an entry, in milliseconds.
    #[arg(long, default_value_t = 6000)]
    pub wait_ms: u64,
}

impl DemoArgs {
    /// The cache configuration described by these arguments.
    ///
    /// Not validated; building the cache reports bad values.
    pub fn config(&self) -> CacheConfig {
        CacheConfig::new()
            .max_size(self.max_size)
            .ttl_millis(self.ttl_ms)
    }

    /// The pause used to let entries expire.
    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let args = DemoArgs::parse_from(["demo"]);
        assert_eq!(args.max_size, 3);
        assert_eq!(args.ttl_ms, 5000);
        assert_eq!(args.wait(), Duration::from_millis(6000));
    }

    #[test]
    fn test_parse_overrides() {
        let args = DemoArgs::parse_from([
            "demo",
            "--max-size",
            "10",
            "--ttl-ms",
            "50",
            "--wait-ms",
            "80",
        ]);
        let config = args.config();
        assert_eq!(config.get_max_size(), 10);
        assert_eq!(config.get_ttl(), Duration::from_millis(50));
        assert_eq!(args.wait(), Duration::from_millis(80));
    }

    #[test]
    fn test_zero_size_fails_validation() {
        let args = DemoArgs::parse_from(["demo", "--max-size", "0"]);
        assert!(args.config().build().is_err());
    }

    #[test]
    fn test_rejects_negative_size() {
        assert!(DemoArgs::try_parse_from(["demo", "--max-size", "-1"]).is_err());
    }
}
