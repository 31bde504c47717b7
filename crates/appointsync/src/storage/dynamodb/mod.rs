//! DynamoDB storage backend.
//!
//! Implements [`appointsync_core::storage::ItemStore`] on top of `aws-sdk-dynamodb`.

mod conversions;
mod error;
mod store;

pub use store::{DynamoDbSettings, DynamoDbStore};
