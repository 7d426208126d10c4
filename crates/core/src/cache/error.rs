use thiserror::Error;

/// Errors that can occur during cache operations.
///
/// Both variants mean the cache tier is unavailable for the current
/// operation. Callers on the read path treat them as a miss.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Cache operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
