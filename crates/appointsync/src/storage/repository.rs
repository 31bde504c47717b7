use std::sync::Arc;

use appointsync_core::item::{Item, Key, KeySchema};
use appointsync_core::storage::{
    Collected, ItemStore, KeyCondition, Page, Projection, QueryOptions, Result, ScanOptions,
    StoreError, UpdateExpression,
};

use crate::observe::observe_and_propagate;

/// Item operations on one table.
///
/// Every call is logged on failure and the error returned unchanged. Keys must match
/// the table's key schema.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn ItemStore>,
    table: String,
    schema: KeySchema,
}

impl Repository {
    pub fn new(store: Arc<dyn ItemStore>, table: impl Into<String>, schema: KeySchema) -> Self {
        Self {
            store,
            table: table.into(),
            schema,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn schema(&self) -> &KeySchema {
        &self.schema
    }

    pub async fn get(&self, key: &Key) -> Result<Option<Item>> {
        observe_and_propagate("get", async {
            self.schema.check(key)?;
            self.store.get_item(&self.table, key, None).await
        })
        .await
    }

    /// Whether an item with `key` exists. Only the key attributes are read.
    pub async fn exist(&self, key: &Key) -> Result<bool> {
        observe_and_propagate("exist", async {
            self.schema.check(key)?;
            let item = self
                .store
                .get_item(&self.table, key, Some(&Projection::key_only(key)))
                .await?;
            Ok::<_, StoreError>(item.is_some())
        })
        .await
    }

    /// Writes `item`, replacing any item with the same key.
    pub async fn save(&self, item: &Item) -> Result<()> {
        observe_and_propagate("save", async {
            self.schema.key_from_item(item)?;
            self.store.put_item(&self.table, item).await?;
            tracing::debug!(table = %self.table, "Item saved");
            Ok::<_, StoreError>(())
        })
        .await
    }

    /// Assigns each of `attributes` on the item with `key`, creating it if absent.
    pub async fn update(&self, key: &Key, attributes: &Item) -> Result<()> {
        observe_and_propagate("update", async {
            self.schema.check(key)?;
            let update = UpdateExpression::set(attributes)?;
            self.store.update_item(&self.table, key, &update).await
        })
        .await
    }

    pub async fn delete(&self, key: &Key) -> Result<()> {
        observe_and_propagate("delete", async {
            self.schema.check(key)?;
            self.store.delete_item(&self.table, key).await
        })
        .await
    }

    pub async fn query(&self, condition: &KeyCondition, options: &QueryOptions) -> Result<Page> {
        observe_and_propagate("query", self.store.query(&self.table, condition, options)).await
    }

    /// Reads every page of a query, following continuation tokens.
    pub async fn query_all(
        &self,
        condition: &KeyCondition,
        options: &QueryOptions,
    ) -> Result<Collected> {
        observe_and_propagate("query_all", async {
            let mut options = options.clone();
            let mut collected = Collected::default();
            let mut pages = 0_usize;

            loop {
                let page = self.store.query(&self.table, condition, &options).await?;
                pages += 1;
                match collected.absorb(page) {
                    Some(token) => options.start_from = Some(token),
                    None => break,
                }
            }

            tracing::debug!(table = %self.table, pages, count = collected.count, "Query collected");
            Ok::<_, StoreError>(collected)
        })
        .await
    }

    pub async fn scan(&self, options: &ScanOptions) -> Result<Page> {
        observe_and_propagate("scan", self.store.scan(&self.table, options)).await
    }

    /// Reads every page of a scan, following continuation tokens.
    pub async fn scan_all(&self, options: &ScanOptions) -> Result<Collected> {
        observe_and_propagate("scan_all", async {
            let mut options = options.clone();
            let mut collected = Collected::default();

            loop {
                let page = self.store.scan(&self.table, &options).await?;
                match collected.absorb(page) {
                    Some(token) => options.start_from = Some(token),
                    None => break,
                }
            }

            Ok::<_, StoreError>(collected)
        })
        .await
    }
}
