use crate::account::AccountNumber;

/// Prefix of every account cache key.
///
/// The trailing digit versions the cached document layout; bump it when the
/// serialized form of `Account` changes incompatibly.
pub const ACCOUNT_KEY_PREFIX: &str = "Account5";

/// Returns the cache key for an account.
///
/// # Examples
///
/// ```
/// use accountsync_core::account::AccountNumber;
/// use accountsync_core::cache::account_key;
///
/// let number = AccountNumber::new("+14152222222").unwrap();
/// assert_eq!(account_key(&number), "Account5+14152222222");
/// ```
pub fn account_key(number: &AccountNumber) -> String {
    format!("{}{}", ACCOUNT_KEY_PREFIX, number)
}
