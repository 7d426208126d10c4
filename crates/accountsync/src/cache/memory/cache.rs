//! In-memory cache implementation with LRU eviction.
//!
//! Provides a thread-safe in-process cache with TTL support using
//! tokio synchronization primitives and LRU eviction policy.
//!
//! There is no replication: `read_connection` and `write_connection` hand out
//! handles to the same store.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;

use accountsync_core::cache::{CacheConnection, ReplicatedCache, Result};

type Store = Arc<RwLock<LruCache<String, CacheEntry>>>;

/// A single cache entry with optional expiration.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    /// Creates a new cache entry with optional TTL.
    fn new(value: String, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.map(|d| Instant::now() + d);
        Self { value, expires_at }
    }

    /// Returns true if this entry has expired.
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() > exp)
    }
}

/// In-memory cache implementation with LRU eviction.
///
/// Thread-safe cache using `Arc<RwLock<LruCache>>` for concurrent access.
/// Supports TTL with lazy expiration (expired entries are dropped on access).
/// Uses LRU eviction to limit memory usage when max_entries is reached.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Store,
    ttl: Option<Duration>,
}

impl MemoryCache {
    /// Creates a new in-memory cache with LRU eviction.
    ///
    /// # Arguments
    ///
    /// * `max_entries` - Maximum number of entries before LRU eviction kicks in.
    /// * `ttl` - Time-to-live applied to every entry written, `None` for no expiry.
    ///
    /// # Panics
    ///
    /// Panics if `max_entries` is 0.
    pub fn new(max_entries: usize, ttl: Option<Duration>) -> Self {
        let capacity = NonZeroUsize::new(max_entries).expect("max_entries must be > 0");
        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
            ttl,
        }
    }

    fn connection(&self) -> MemoryConnection {
        MemoryConnection {
            store: self.store.clone(),
            ttl: self.ttl,
        }
    }
}

#[async_trait]
impl ReplicatedCache for MemoryCache {
    type Connection = MemoryConnection;

    async fn read_connection(&self) -> Result<MemoryConnection> {
        Ok(self.connection())
    }

    async fn write_connection(&self) -> Result<MemoryConnection> {
        Ok(self.connection())
    }
}

/// Handle to the shared in-memory store.
#[derive(Debug)]
pub struct MemoryConnection {
    store: Store,
    ttl: Option<Duration>,
}

#[async_trait]
impl CacheConnection for MemoryConnection {
    async fn get(&mut self, key: &str) -> Result<Option<String>> {
        let mut store = self.store.write().await;

        let expired = match store.get(key) {
            Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };

        if expired {
            store.pop(key);
        }

        Ok(None)
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut store = self.store.write().await;
        store.put(key.to_string(), CacheEntry::new(value.to_string(), self.ttl));
        Ok(())
    }
}
