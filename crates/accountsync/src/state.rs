//! Application state.
//!
//! The shared state handed to every request handler. Accounts are resolved
//! through the cache-aside decorator; the concrete storage and cache backends
//! are chosen by feature flags.

use std::sync::Arc;

use accountsync_core::storage::AccountRepository;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Account repository (cached, wraps underlying storage).
    pub accounts: Arc<dyn AccountRepository>,
    /// Name of the compiled-in storage backend.
    pub storage_backend: &'static str,
    /// Name of the compiled-in cache backend.
    pub cache_backend: &'static str,
}

impl AppState {
    fn build(accounts: Arc<dyn AccountRepository>) -> Self {
        Self {
            accounts,
            storage_backend: STORAGE_BACKEND,
            cache_backend: CACHE_BACKEND,
        }
    }
}

#[cfg(feature = "inmemory")]
const STORAGE_BACKEND: &str = "inmemory";
#[cfg(feature = "sqlite")]
const STORAGE_BACKEND: &str = "sqlite";

#[cfg(feature = "memory")]
const CACHE_BACKEND: &str = "memory";
#[cfg(feature = "redis")]
const CACHE_BACKEND: &str = "redis";

// ============================================================================
// Factory functions for the storage backends
// ============================================================================

#[cfg(feature = "inmemory")]
mod inmemory_storage {
    use super::*;
    use crate::config::Config;
    use crate::mock_data::demo_accounts;
    use crate::storage::cached::CachedAccountRepository;
    use crate::storage::InMemoryRepository;

    impl AppState {
        /// Creates AppState with in-memory storage seeded with demo accounts.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let repo = Arc::new(InMemoryRepository::new());
            for account in demo_accounts()? {
                repo.insert_account(account).await?;
            }

            let cache = Arc::new(super::connect_cache(config).await?);

            Ok(Self::build(Arc::new(CachedAccountRepository::new(repo, cache))))
        }
    }
}

#[cfg(feature = "sqlite")]
mod sqlite_storage {
    use super::*;
    use crate::config::Config;
    use crate::storage::cached::CachedAccountRepository;
    use crate::storage::SqliteRepository;

    impl AppState {
        /// Creates AppState with SQLite storage.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let repo = Arc::new(SqliteRepository::new(&config.sqlite_path).await?);
            tracing::info!(path = %config.sqlite_path, "Opened SQLite database");

            let cache = Arc::new(super::connect_cache(config).await?);

            Ok(Self::build(Arc::new(CachedAccountRepository::new(repo, cache))))
        }
    }
}

// ============================================================================
// Cache backend construction
// ============================================================================

#[cfg(feature = "memory")]
async fn connect_cache(
    config: &crate::config::Config,
) -> Result<crate::cache::MemoryCache, anyhow::Error> {
    Ok(crate::cache::MemoryCache::new(
        config.cache_max_entries,
        config.cache_ttl(),
    ))
}

#[cfg(feature = "redis")]
async fn connect_cache(
    config: &crate::config::Config,
) -> Result<crate::cache::RedisReplicatedCache, anyhow::Error> {
    let cache = crate::cache::RedisReplicatedCache::new(
        &config.redis_url,
        &config.redis_replica_urls,
        config.cache_ttl(),
    )
    .await?;
    Ok(cache)
}

#[cfg(test)]
impl AppState {
    /// Creates an AppState around an arbitrary repository for handler tests.
    pub fn with_repository(accounts: Arc<dyn AccountRepository>) -> Self {
        Self::build(accounts)
    }
}
