//! Cached account repository decorator.
//!
//! Wraps an `AccountRepository` implementation with cache-aside reads over a
//! `ReplicatedCache`.

use std::sync::Arc;

use async_trait::async_trait;

use accountsync_core::account::{Account, AccountNumber};
use accountsync_core::cache::{
    account_key, deserialize_account, serialize_account, CacheConnection, ReplicatedCache,
};
use accountsync_core::storage::{AccountRepository, Result};

/// Cached account repository decorator.
///
/// Resolution order for a single call:
/// 1. Read `Account5<number>` through a read connection
/// 2. On a miss (absent, cache error, malformed value) query the repository
/// 3. If the repository found the account, write it through a write connection
///
/// Each cache connection is held only for its own step and is dropped before
/// the next one starts. The repository result is returned whatever happens to
/// the cache write.
///
/// # Type Parameters
///
/// * `R` - The underlying repository implementation
/// * `C` - The replicated cache implementation
pub struct CachedAccountRepository<R, C>
where
    R: AccountRepository,
    C: ReplicatedCache,
{
    repository: Arc<R>,
    cache: Arc<C>,
}

impl<R, C> CachedAccountRepository<R, C>
where
    R: AccountRepository,
    C: ReplicatedCache,
{
    /// Creates a new cached account repository.
    ///
    /// # Arguments
    ///
    /// * `repository` - The source of truth for accounts
    /// * `cache` - The replicated cache used for reads and repopulation
    pub fn new(repository: Arc<R>, cache: Arc<C>) -> Self {
        Self { repository, cache }
    }

    /// Reads and decodes the cached account, `None` on any kind of miss.
    async fn read_cached(&self, number: &AccountNumber, cache_key: &str) -> Option<Account> {
        let value = {
            let mut conn = match self.cache.read_connection().await {
                Ok(conn) => conn,
                Err(err) => {
                    tracing::warn!(%number, error = %err, "Failed to acquire cache read connection");
                    return None;
                }
            };

            match conn.get(cache_key).await {
                Ok(value) => value?,
                Err(err) => {
                    tracing::warn!(%number, error = %err, "Cache read failed");
                    return None;
                }
            }
        };

        match deserialize_account(&value) {
            Ok(account) if account.number() == number => Some(account),
            Ok(account) => {
                tracing::warn!(
                    %number,
                    cached_number = %account.number(),
                    "Cached account does not match its key"
                );
                None
            }
            Err(err) => {
                tracing::warn!(%number, error = %err, "Cache account deserialization failed");
                None
            }
        }
    }

    /// Writes the account to the cache. Failures are logged and dropped.
    async fn populate(&self, account: &Account, cache_key: &str) {
        let number = account.number();

        let value = match serialize_account(account) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(%number, error = %err, "Account serialization failed");
                return;
            }
        };

        let mut conn = match self.cache.write_connection().await {
            Ok(conn) => conn,
            Err(err) => {
                tracing::warn!(%number, error = %err, "Failed to acquire cache write connection");
                return;
            }
        };

        if let Err(err) = conn.set(cache_key, &value).await {
            tracing::warn!(%number, error = %err, "Failed to cache account");
        }
    }
}

#[async_trait]
impl<R, C> AccountRepository for CachedAccountRepository<R, C>
where
    R: AccountRepository + 'static,
    C: ReplicatedCache + 'static,
{
    async fn get_account(&self, number: &AccountNumber) -> Result<Option<Account>> {
        let cache_key = account_key(number);

        if let Some(account) = self.read_cached(number, &cache_key).await {
            tracing::trace!(%number, "Cache hit for account");
            return Ok(Some(account));
        }

        tracing::trace!(%number, "Cache miss for account");
        let account = self.repository.get_account(number).await?;

        if let Some(ref a) = account {
            self.populate(a, &cache_key).await;
        }

        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashMap};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use accountsync_core::cache::{CacheError, Result as CacheResult};
    use accountsync_core::storage::RepositoryError;

    const NUMBER: &str = "+14152222222";
    const KEY: &str = "Account5+14152222222";

    /// How a mock cache operation behaves.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    enum Behavior {
        #[default]
        Ok,
        FailAcquire,
        FailOperation,
    }

    /// Records every interaction with the mock cache.
    #[derive(Debug, Default)]
    struct CacheProbe {
        store: Mutex<HashMap<String, String>>,
        gets: Mutex<Vec<String>>,
        sets: Mutex<Vec<(String, String)>>,
        read_acquired: AtomicUsize,
        write_acquired: AtomicUsize,
        released: AtomicUsize,
        reads: Mutex<Behavior>,
        writes: Mutex<Behavior>,
    }

    impl CacheProbe {
        fn live(&self) -> usize {
            self.read_acquired.load(Ordering::SeqCst) + self.write_acquired.load(Ordering::SeqCst)
                - self.released.load(Ordering::SeqCst)
        }

        fn gets(&self) -> Vec<String> {
            self.gets.lock().unwrap().clone()
        }

        fn sets(&self) -> Vec<(String, String)> {
            self.sets.lock().unwrap().clone()
        }
    }

    /// Cache double with a read and a write path over one shared probe.
    #[derive(Debug, Default)]
    struct MockCache {
        probe: Arc<CacheProbe>,
    }

    impl MockCache {
        fn with_value(self, key: &str, value: &str) -> Self {
            self.probe
                .store
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            self
        }

        fn reads(self, behavior: Behavior) -> Self {
            *self.probe.reads.lock().unwrap() = behavior;
            self
        }

        fn writes(self, behavior: Behavior) -> Self {
            *self.probe.writes.lock().unwrap() = behavior;
            self
        }
    }

    struct MockConnection {
        probe: Arc<CacheProbe>,
        behavior: Behavior,
    }

    impl Drop for MockConnection {
        fn drop(&mut self) {
            self.probe.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl CacheConnection for MockConnection {
        async fn get(&mut self, key: &str) -> CacheResult<Option<String>> {
            self.probe.gets.lock().unwrap().push(key.to_string());
            if self.behavior == Behavior::FailOperation {
                return Err(CacheError::ConnectionFailed("Connection lost!".to_string()));
            }
            Ok(self.probe.store.lock().unwrap().get(key).cloned())
        }

        async fn set(&mut self, key: &str, value: &str) -> CacheResult<()> {
            self.probe
                .sets
                .lock()
                .unwrap()
                .push((key.to_string(), value.to_string()));
            if self.behavior == Behavior::FailOperation {
                return Err(CacheError::OperationFailed("READONLY".to_string()));
            }
            self.probe
                .store
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    #[async_trait]
    impl ReplicatedCache for MockCache {
        type Connection = MockConnection;

        async fn read_connection(&self) -> CacheResult<MockConnection> {
            let behavior = *self.probe.reads.lock().unwrap();
            if behavior == Behavior::FailAcquire {
                return Err(CacheError::ConnectionFailed("no replica".to_string()));
            }
            self.probe.read_acquired.fetch_add(1, Ordering::SeqCst);
            Ok(MockConnection {
                probe: self.probe.clone(),
                behavior,
            })
        }

        async fn write_connection(&self) -> CacheResult<MockConnection> {
            let behavior = *self.probe.writes.lock().unwrap();
            if behavior == Behavior::FailAcquire {
                return Err(CacheError::ConnectionFailed("no primary".to_string()));
            }
            self.probe.write_acquired.fetch_add(1, Ordering::SeqCst);
            Ok(MockConnection {
                probe: self.probe.clone(),
                behavior,
            })
        }
    }

    // Mock repository that tracks calls and open cache connections
    struct MockAccountRepository {
        accounts: Mutex<HashMap<AccountNumber, Account>>,
        get_calls: AtomicUsize,
        fail: bool,
        probe: Arc<CacheProbe>,
        live_connections_at_query: Mutex<Vec<usize>>,
    }

    impl MockAccountRepository {
        fn new(probe: Arc<CacheProbe>) -> Self {
            Self {
                accounts: Mutex::new(HashMap::new()),
                get_calls: AtomicUsize::new(0),
                fail: false,
                probe,
                live_connections_at_query: Mutex::new(Vec::new()),
            }
        }

        fn failing(probe: Arc<CacheProbe>) -> Self {
            Self {
                fail: true,
                ..Self::new(probe)
            }
        }

        fn with_account(self, account: Account) -> Self {
            self.accounts
                .lock()
                .unwrap()
                .insert(account.number().clone(), account);
            self
        }

        fn get_calls(&self) -> usize {
            self.get_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AccountRepository for MockAccountRepository {
        async fn get_account(&self, number: &AccountNumber) -> Result<Option<Account>> {
            self.get_calls.fetch_add(1, Ordering::SeqCst);
            self.live_connections_at_query
                .lock()
                .unwrap()
                .push(self.probe.live());
            if self.fail {
                return Err(RepositoryError::ConnectionFailed("database down".to_string()));
            }
            Ok(self.accounts.lock().unwrap().get(number).cloned())
        }
    }

    fn number() -> AccountNumber {
        AccountNumber::new(NUMBER).unwrap()
    }

    fn stored_account() -> Account {
        Account::new(number(), BTreeSet::new(), &[0u8; 16]).unwrap()
    }

    fn resolver(
        repo: MockAccountRepository,
        cache: MockCache,
    ) -> (
        CachedAccountRepository<MockAccountRepository, MockCache>,
        Arc<MockAccountRepository>,
        Arc<CacheProbe>,
    ) {
        let probe = cache.probe.clone();
        let repo = Arc::new(repo);
        let resolver = CachedAccountRepository::new(repo.clone(), Arc::new(cache));
        (resolver, repo, probe)
    }

    #[tokio::test]
    async fn test_get_account_in_cache() {
        let cache = MockCache::default().with_value(KEY, r#"{"number": "+14152222222", "name": "test"}"#);
        let repo = MockAccountRepository::new(cache.probe.clone());
        let (resolver, repo, probe) = resolver(repo, cache);

        let account = resolver.get_account(&number()).await.unwrap().unwrap();

        assert_eq!(account.number().as_str(), NUMBER);
        assert_eq!(account.profile_name(), Some("test"));

        assert_eq!(probe.gets(), vec![KEY.to_string()]);
        assert!(probe.sets().is_empty());
        assert_eq!(probe.read_acquired.load(Ordering::SeqCst), 1);
        assert_eq!(probe.write_acquired.load(Ordering::SeqCst), 0);
        assert_eq!(probe.released.load(Ordering::SeqCst), 1);
        assert_eq!(repo.get_calls(), 0);
    }

    #[tokio::test]
    async fn test_get_account_not_in_cache() {
        let cache = MockCache::default();
        let repo = MockAccountRepository::new(cache.probe.clone()).with_account(stored_account());
        let (resolver, repo, probe) = resolver(repo, cache);

        let retrieved = resolver.get_account(&number()).await.unwrap();

        assert_eq!(retrieved, Some(stored_account()));

        assert_eq!(probe.gets(), vec![KEY.to_string()]);
        let sets = probe.sets();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].0, KEY);
        assert_eq!(deserialize_account(&sets[0].1).unwrap(), stored_account());
        assert_eq!(probe.released.load(Ordering::SeqCst), 2);
        assert_eq!(repo.get_calls(), 1);
    }

    #[tokio::test]
    async fn test_get_account_broken_cache() {
        let cache = MockCache::default()
            .reads(Behavior::FailOperation)
            .writes(Behavior::FailOperation);
        let repo = MockAccountRepository::new(cache.probe.clone()).with_account(stored_account());
        let (resolver, repo, probe) = resolver(repo, cache);

        let retrieved = resolver.get_account(&number()).await.unwrap();

        assert_eq!(retrieved, Some(stored_account()));

        assert_eq!(probe.gets(), vec![KEY.to_string()]);
        assert_eq!(probe.sets().len(), 1);
        assert_eq!(probe.sets()[0].0, KEY);
        assert_eq!(probe.released.load(Ordering::SeqCst), 2);
        assert_eq!(repo.get_calls(), 1);
    }

    #[tokio::test]
    async fn test_read_failure_with_healthy_write_repopulates() {
        let cache = MockCache::default().reads(Behavior::FailOperation);
        let repo = MockAccountRepository::new(cache.probe.clone()).with_account(stored_account());
        let (resolver, repo, probe) = resolver(repo, cache);

        let retrieved = resolver.get_account(&number()).await.unwrap();

        assert_eq!(retrieved, Some(stored_account()));
        assert_eq!(repo.get_calls(), 1);
        assert!(probe.store.lock().unwrap().contains_key(KEY));
    }

    #[tokio::test]
    async fn test_read_acquire_failure_falls_back() {
        let cache = MockCache::default().reads(Behavior::FailAcquire);
        let repo = MockAccountRepository::new(cache.probe.clone()).with_account(stored_account());
        let (resolver, repo, probe) = resolver(repo, cache);

        let retrieved = resolver.get_account(&number()).await.unwrap();

        assert_eq!(retrieved, Some(stored_account()));
        assert!(probe.gets().is_empty());
        assert_eq!(probe.sets().len(), 1);
        assert_eq!(probe.read_acquired.load(Ordering::SeqCst), 0);
        assert_eq!(probe.released.load(Ordering::SeqCst), 1);
        assert_eq!(repo.get_calls(), 1);
    }

    #[tokio::test]
    async fn test_write_acquire_failure_is_swallowed() {
        let cache = MockCache::default().writes(Behavior::FailAcquire);
        let repo = MockAccountRepository::new(cache.probe.clone()).with_account(stored_account());
        let (resolver, _repo, probe) = resolver(repo, cache);

        let retrieved = resolver.get_account(&number()).await.unwrap();

        assert_eq!(retrieved, Some(stored_account()));
        assert!(probe.sets().is_empty());
        assert_eq!(probe.write_acquired.load(Ordering::SeqCst), 0);
        assert_eq!(probe.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_write_failure_is_swallowed() {
        let cache = MockCache::default().writes(Behavior::FailOperation);
        let repo = MockAccountRepository::new(cache.probe.clone()).with_account(stored_account());
        let (resolver, _repo, probe) = resolver(repo, cache);

        let retrieved = resolver.get_account(&number()).await.unwrap();

        assert_eq!(retrieved, Some(stored_account()));
        assert_eq!(probe.sets().len(), 1);
        assert!(!probe.store.lock().unwrap().contains_key(KEY));
        assert_eq!(probe.released.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_account_not_found_skips_cache_write() {
        let cache = MockCache::default();
        let repo = MockAccountRepository::new(cache.probe.clone());
        let (resolver, repo, probe) = resolver(repo, cache);

        let retrieved = resolver.get_account(&number()).await.unwrap();

        assert_eq!(retrieved, None);
        assert_eq!(repo.get_calls(), 1);
        assert!(probe.sets().is_empty());
        assert_eq!(probe.write_acquired.load(Ordering::SeqCst), 0);
        assert_eq!(probe.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_repository_error_propagates() {
        let cache = MockCache::default();
        let repo = MockAccountRepository::failing(cache.probe.clone());
        let (resolver, repo, probe) = resolver(repo, cache);

        let err = resolver.get_account(&number()).await.unwrap_err();

        assert!(matches!(err, RepositoryError::ConnectionFailed(_)));
        assert_eq!(repo.get_calls(), 1);
        assert!(probe.sets().is_empty());
        assert_eq!(probe.live(), 0);
    }

    #[tokio::test]
    async fn test_repository_error_propagates_with_broken_cache() {
        let cache = MockCache::default().reads(Behavior::FailOperation);
        let repo = MockAccountRepository::failing(cache.probe.clone());
        let (resolver, _repo, probe) = resolver(repo, cache);

        assert!(resolver.get_account(&number()).await.is_err());
        assert_eq!(probe.live(), 0);
    }

    #[tokio::test]
    async fn test_malformed_cache_value_treated_as_miss() {
        let cache = MockCache::default().with_value(KEY, "{not json");
        let repo = MockAccountRepository::new(cache.probe.clone()).with_account(stored_account());
        let (resolver, repo, probe) = resolver(repo, cache);

        let retrieved = resolver.get_account(&number()).await.unwrap();

        assert_eq!(retrieved, Some(stored_account()));
        assert_eq!(repo.get_calls(), 1);
        let cached = probe.store.lock().unwrap().get(KEY).cloned().unwrap();
        assert_eq!(deserialize_account(&cached).unwrap(), stored_account());
    }

    #[tokio::test]
    async fn test_cached_value_for_other_number_treated_as_miss() {
        let cache = MockCache::default().with_value(KEY, r#"{"number": "+14153333333"}"#);
        let repo = MockAccountRepository::new(cache.probe.clone()).with_account(stored_account());
        let (resolver, repo, _probe) = resolver(repo, cache);

        let retrieved = resolver.get_account(&number()).await.unwrap();

        assert_eq!(retrieved, Some(stored_account()));
        assert_eq!(repo.get_calls(), 1);
    }

    #[tokio::test]
    async fn test_no_cache_connection_held_during_repository_query() {
        let cache = MockCache::default();
        let repo = MockAccountRepository::new(cache.probe.clone()).with_account(stored_account());
        let (resolver, repo, probe) = resolver(repo, cache);

        resolver.get_account(&number()).await.unwrap();

        assert_eq!(*repo.live_connections_at_query.lock().unwrap(), vec![0]);
        assert_eq!(probe.live(), 0);
    }

    #[tokio::test]
    async fn test_repeated_gets_converge_on_cache() {
        let cache = MockCache::default();
        let repo = MockAccountRepository::new(cache.probe.clone()).with_account(stored_account());
        let (resolver, repo, probe) = resolver(repo, cache);

        let first = resolver.get_account(&number()).await.unwrap();
        let second = resolver.get_account(&number()).await.unwrap();
        let third = resolver.get_account(&number()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second, third);
        assert_eq!(repo.get_calls(), 1);
        assert_eq!(probe.sets().len(), 1);
        // 3 reads + 1 write
        assert_eq!(probe.released.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_concurrent_gets_return_same_account() {
        let cache = MockCache::default();
        let repo = MockAccountRepository::new(cache.probe.clone()).with_account(stored_account());
        let (resolver, _repo, probe) = resolver(repo, cache);
        let resolver = Arc::new(resolver);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let resolver = resolver.clone();
                tokio::spawn(async move { resolver.get_account(&number()).await })
            })
            .collect();

        for handle in handles {
            let account = handle.await.unwrap().unwrap();
            assert_eq!(account, Some(stored_account()));
        }

        assert_eq!(probe.live(), 0);
    }
}
