//! Demonstration driver.
//!
//! Prints a timed trace of puts, gets, LRU eviction, TTL expiry and
//! compute-on-miss against a small cache.

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lru_ttl_cache::{cli::DemoArgs, Cache};

/// Print the outcome of reading `key`.
fn show(cache: &Cache<String, i32>, key: &str, missing: &str) {
    match cache.get(key) {
        Some(value) => println!("{}: {}", key, value),
        None => println!("{}", missing),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Defaults to "info" for this crate, can be overridden with RUST_LOG
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lru_ttl_cache=info,demo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = DemoArgs::parse();
    let config = args.config().build()?;
    info!(
        max_size = config.get_max_size(),
        ttl_ms = args.ttl_ms,
        "starting cache demo"
    );

    let cache: Cache<String, i32> = Cache::builder()
        .config(config)
        .logger(|event| println!("[LOG]: {}", event))
        .on_evict(|key, value| println!("[EVICTED]: Key = {}, Value = {}", key, value))
        .build()?;

    println!("Adding items to the cache...");
    cache.put("key1".to_string(), 100);
    cache.put("key2".to_string(), 200);
    cache.put("key3".to_string(), 300);

    println!("Retrieving items from the cache...");
    show(&cache, "key1", "key1 not found in the cache.");
    show(&cache, "key2", "key2 not found in the cache.");
    show(&cache, "key3", "key3 not found in the cache.");

    println!("Adding a 4th item to trigger eviction...");
    cache.put("key4".to_string(), 400);

    println!("Final state of the cache after eviction:");
    show(&cache, "key1", "key1 has been evicted!");
    show(&cache, "key2", "key2 evicted!");
    show(&cache, "key3", "key3 evicted!");
    show(&cache, "key4", "key4 evicted!");

    println!("Accessing key2 again after TTL expires...");
    std::thread::sleep(args.wait());
    show(&cache, "key2", "key2 expired and evicted!");

    println!("Using 'with_cache' to fetch or compute a value...");
    let computed = cache.with_cache("key5".to_string(), || {
        println!("Computing value for key5...");
        Some(500)
    });
    println!("key5: {:?}", computed);

    println!("Using 'with_cache' for key3, cached before the wait...");
    let mut recomputed = false;
    let cached = cache.with_cache("key3".to_string(), || {
        recomputed = true;
        Some(999)
    });
    if recomputed {
        println!("key3 had expired, so its value was recomputed.");
    } else {
        println!("key3 was still cached, nothing was computed.");
    }
    println!("key3: {:?}", cached);

    let stats = cache.stats();
    info!(
        hits = stats.hits,
        misses = stats.misses,
        evictions = stats.evictions,
        expirations = stats.expirations,
        size = stats.size,
        "demo finished"
    );
    Ok(())
}
