use async_trait::async_trait;

use super::Result;

/// A connection to one node of a replicated cache.
///
/// A connection is released when it is dropped, so every acquisition is
/// released exactly once on every exit path.
#[async_trait]
pub trait CacheConnection: Send {
    /// Gets a value from the cache by key.
    async fn get(&mut self, key: &str) -> Result<Option<String>>;

    /// Stores a value under key. Single-key semantics only.
    async fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// A cache with distinct read (replica) and write (primary) access paths.
///
/// Both paths may be backed by the same physical resource; callers must not
/// assume they differ.
#[async_trait]
pub trait ReplicatedCache: Send + Sync {
    type Connection: CacheConnection;

    /// Acquires a connection to a read-capable replica.
    async fn read_connection(&self) -> Result<Self::Connection>;

    /// Acquires a connection to the write-capable primary.
    async fn write_connection(&self) -> Result<Self::Connection>;
}
