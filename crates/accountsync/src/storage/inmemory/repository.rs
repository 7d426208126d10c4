//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use accountsync_core::account::{Account, AccountNumber};
use accountsync_core::storage::{AccountRepository, RepositoryError, Result};

/// In-memory storage backend for testing.
///
/// Data is not persisted and will be lost when the repository is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    accounts: Arc<RwLock<HashMap<AccountNumber, Account>>>,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::AlreadyExists` if the number is taken.
    pub async fn insert_account(&self, account: Account) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(account.number()) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Account",
                id: account.number().to_string(),
            });
        }
        accounts.insert(account.number().clone(), account);
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for InMemoryRepository {
    async fn get_account(&self, number: &AccountNumber) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(number).cloned())
    }
}
