//! Redis replicated cache implementation.
//!
//! One `ConnectionManager` is kept per node. Acquiring a connection clones
//! the manager for the selected node, so acquisition never blocks on the
//! network; reconnects are handled by the manager itself.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use accountsync_core::cache::{CacheConnection, ReplicatedCache, Result};

use super::error::map_redis_error;

/// Which node a connection is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Primary,
    Replica(usize),
}

/// Redis backend with a write primary and zero or more read replicas.
///
/// Replicas are selected round-robin. Without replicas, reads are served by
/// the primary.
pub struct RedisReplicatedCache {
    primary: ConnectionManager,
    replicas: Vec<ConnectionManager>,
    next_replica: AtomicUsize,
    ttl: Option<Duration>,
}

impl RedisReplicatedCache {
    /// Connects to the primary and every replica.
    ///
    /// # Arguments
    ///
    /// * `primary_url` - Redis primary URL (e.g., "redis://localhost:6379")
    /// * `replica_urls` - Read replica URLs, may be empty
    /// * `ttl` - Time-to-live applied to every entry written, `None` for no expiry
    ///
    /// # Errors
    ///
    /// Returns `CacheError::ConnectionFailed` if any node cannot be reached.
    pub async fn new(
        primary_url: &str,
        replica_urls: &[String],
        ttl: Option<Duration>,
    ) -> Result<Self> {
        let primary = connect(primary_url).await?;

        let mut replicas = Vec::with_capacity(replica_urls.len());
        for url in replica_urls {
            replicas.push(connect(url).await?);
        }

        tracing::info!(replicas = replicas.len(), "Connected to Redis");

        Ok(Self {
            primary,
            replicas,
            next_replica: AtomicUsize::new(0),
            ttl,
        })
    }
}

async fn connect(url: &str) -> Result<ConnectionManager> {
    let client = redis::Client::open(url).map_err(map_redis_error)?;
    ConnectionManager::new(client).await.map_err(map_redis_error)
}

#[async_trait]
impl ReplicatedCache for RedisReplicatedCache {
    type Connection = RedisConnection;

    async fn read_connection(&self) -> Result<RedisConnection> {
        if self.replicas.is_empty() {
            return self.write_connection().await;
        }

        let index = self.next_replica.fetch_add(1, Ordering::Relaxed) % self.replicas.len();
        Ok(RedisConnection::new(
            self.replicas[index].clone(),
            Role::Replica(index),
            self.ttl,
        ))
    }

    async fn write_connection(&self) -> Result<RedisConnection> {
        Ok(RedisConnection::new(
            self.primary.clone(),
            Role::Primary,
            self.ttl,
        ))
    }
}

/// A connection routed to one Redis node. Released on drop.
pub struct RedisConnection {
    conn: ConnectionManager,
    role: Role,
    ttl: Option<Duration>,
}

impl RedisConnection {
    fn new(conn: ConnectionManager, role: Role, ttl: Option<Duration>) -> Self {
        tracing::trace!(role = ?role, "Acquired Redis connection");
        Self { conn, role, ttl }
    }
}

impl Drop for RedisConnection {
    fn drop(&mut self) {
        tracing::trace!(role = ?self.role, "Released Redis connection");
    }
}

#[async_trait]
impl CacheConnection for RedisConnection {
    async fn get(&mut self, key: &str) -> Result<Option<String>> {
        self.conn
            .get::<_, Option<String>>(key)
            .await
            .map_err(map_redis_error)
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match self.ttl {
            Some(duration) => {
                let seconds = duration.as_secs().max(1);
                self.conn
                    .set_ex::<_, _, ()>(key, value, seconds)
                    .await
                    .map_err(map_redis_error)
            }
            None => self
                .conn
                .set::<_, _, ()>(key, value)
                .await
                .map_err(map_redis_error),
        }
    }
}
