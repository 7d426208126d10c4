use thiserror::Error;

/// Errors that can occur when constructing account values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("Account number cannot be empty")]
    EmptyNumber,
    #[error("Invalid access key length: expected 16 bytes, got {0}")]
    InvalidAccessKeyLength(usize),
    #[error("Invalid access key encoding: {0}")]
    InvalidAccessKeyEncoding(String),
}
