//! In-memory storage backend for testing.
//!
//! Stores accounts in a HashMap wrapped in `Arc<RwLock<_>>`. Useful for
//! tests and demos where persistence is not required.
//!
//! # Example
//!
//! ```rust,ignore
//! use accountsync::storage::inmemory::InMemoryRepository;
//!
//! let repo = InMemoryRepository::new();
//! repo.insert_account(account).await?;
//! ```

mod repository;

pub use repository::InMemoryRepository;
