//! Cached repository decorators.
//!
//! This module provides a decorator that wraps `AccountRepository` with the
//! cache-aside pattern:
//!
//! - **Reads**: Check the cache read replica first; on a miss, a cache error or
//!   an undecodable value, fetch from the repository and repopulate the cache
//!   through the write primary
//! - **Cache failures** never reach the caller; only repository errors do
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! let repo = Arc::new(SqliteRepository::new("accounts.db").await?);
//! let cache = Arc::new(MemoryCache::new(10_000, None));
//!
//! let accounts = CachedAccountRepository::new(repo, cache);
//! let account = accounts.get_account(&number).await?;
//! ```

mod account;

pub use account::CachedAccountRepository;
