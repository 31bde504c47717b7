use async_trait::async_trait;

use crate::item::{Item, Key};

use super::{
    KeyCondition, Page, Projection, QueryOptions, Result, ScanOptions, TransactItem,
    UpdateExpression,
};

/// A key-value store backend.
///
/// Tables are addressed by name. Implementations translate the rendered expressions
/// into their native request shapes and report every failure as a [`super::StoreError`].
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Gets an item by key, optionally returning only the projected attributes.
    async fn get_item(
        &self,
        table: &str,
        key: &Key,
        projection: Option<&Projection>,
    ) -> Result<Option<Item>>;

    /// Creates or replaces an item.
    async fn put_item(&self, table: &str, item: &Item) -> Result<()>;

    /// Applies a `SET` expression to an item, creating it if absent.
    async fn update_item(&self, table: &str, key: &Key, update: &UpdateExpression) -> Result<()>;

    /// Deletes an item. Deleting a missing item succeeds.
    async fn delete_item(&self, table: &str, key: &Key) -> Result<()>;

    /// Reads one page of items matching the key condition.
    async fn query(
        &self,
        table: &str,
        condition: &KeyCondition,
        options: &QueryOptions,
    ) -> Result<Page>;

    /// Reads one page of the whole table.
    async fn scan(&self, table: &str, options: &ScanOptions) -> Result<Page>;

    /// Applies every write atomically.
    ///
    /// Returns the backend's acknowledgement: `false` when it accepted the call but
    /// reported no outcome.
    async fn transact_write(&self, items: &[TransactItem]) -> Result<bool>;
}
