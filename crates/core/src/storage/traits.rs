use async_trait::async_trait;

use crate::account::{Account, AccountNumber};

use super::Result;

/// Repository for account lookups against the source of truth.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Gets an account by its number.
    ///
    /// `Ok(None)` means the account does not exist.
    async fn get_account(&self, number: &AccountNumber) -> Result<Option<Account>>;
}
