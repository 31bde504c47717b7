//! Storage backends and the repository layer built on them.
//!
//! Backends implement [`appointsync_core::storage::ItemStore`]; callers go through
//! [`Repository`] and [`TransactionalBatchWriter`].
//!
//! # Feature Flags
//!
//! - `dynamodb` (default): AWS DynamoDB backend using `aws-sdk-dynamodb`
//!
//! The in-memory backend is always available.
//!
//! Build without DynamoDB:
//! ```bash
//! cargo build -p appointsync --no-default-features
//! ```

#[cfg(feature = "dynamodb")]
pub mod dynamodb;
pub mod inmemory;
mod repository;
#[cfg(test)]
pub(crate) mod testing;
mod transact;

pub use repository::Repository;
pub use transact::TransactionalBatchWriter;
