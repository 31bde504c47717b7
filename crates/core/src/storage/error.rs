use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    #[error("Update requires at least one attribute")]
    EmptyUpdate,
    #[error("Key condition requires at least one equality")]
    EmptyKeyCondition,
    #[error("Placeholder already in use: {0}")]
    PlaceholderCollision(String),
    #[error("Invalid number: {0:?}")]
    InvalidNumber(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("Transaction cancelled: {0}")]
    TransactionCancelled(String),
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
