//! Pure functions for serializing/deserializing accounts to/from cache values.
//!
//! Cache values are JSON documents, which keeps them readable when inspecting
//! the cache by hand.

use crate::account::Account;
use thiserror::Error;

/// Errors that can occur during cache serialization/deserialization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializationError {
    /// Failed to serialize a value.
    #[error("Failed to serialize: {0}")]
    SerializeFailed(String),
    /// The cached value is not a valid serialized account.
    #[error("Malformed cache value: {0}")]
    MalformedValue(String),
}

/// Result type for serialization operations.
pub type Result<T> = std::result::Result<T, SerializationError>;

/// Serializes an account to a JSON string.
pub fn serialize_account(account: &Account) -> Result<String> {
    serde_json::to_string(account).map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

/// Deserializes a JSON string to an account.
///
/// # Errors
///
/// Returns `SerializationError::MalformedValue` if `value` is not a valid
/// account document.
pub fn deserialize_account(value: &str) -> Result<Account> {
    serde_json::from_str(value).map_err(|e| SerializationError::MalformedValue(e.to_string()))
}
