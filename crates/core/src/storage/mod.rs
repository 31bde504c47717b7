mod error;
mod expression;
mod slicing;
mod traits;
mod types;

pub use error::{Result, StoreError};
pub use expression::{KeyCondition, Placeholders, Projection, RenderedRead, UpdateExpression};
pub use slicing::{slice_ranges, MAX_TRANSACT_SLICE};
pub use traits::ItemStore;
pub use types::{
    Collected, ContinuationToken, Page, QueryOptions, ScanOptions, SortDirection, TransactItem,
};
