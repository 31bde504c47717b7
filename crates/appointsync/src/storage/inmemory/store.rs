use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use appointsync_core::item::{Item, Key, KeySchema};
use appointsync_core::storage::{
    ContinuationToken, ItemStore, KeyCondition, Page, Projection, QueryOptions, RenderedRead,
    Result, ScanOptions, SortDirection, StoreError, TransactItem, UpdateExpression,
};

type StoredKey = (String, Option<String>);

#[derive(Debug, Clone)]
struct Table {
    schema: KeySchema,
    items: BTreeMap<StoredKey, Item>,
}

impl Table {
    fn stored_key(&self, key: &Key) -> Result<StoredKey> {
        self.schema.check(key)?;
        Ok((
            key.partition_value().to_string(),
            key.sort_value().map(str::to_string),
        ))
    }

    fn stored_key_of(&self, item: &Item) -> Result<StoredKey> {
        let key = self.schema.key_from_item(item)?;
        self.stored_key(&key)
    }

    fn reject_key_attributes(&self, attributes: &Item) -> Result<()> {
        match self
            .schema
            .attribute_names()
            .into_iter()
            .find(|name| attributes.contains_key(*name))
        {
            Some(name) => Err(StoreError::InvalidKey(format!(
                "cannot update key attribute '{name}'"
            ))),
            None => Ok(()),
        }
    }

    fn apply_update(&mut self, stored: StoredKey, key: &Key, attributes: &Item) {
        let item = self.items.entry(stored).or_insert_with(|| key.to_item());
        for (name, value) in attributes {
            item.insert(name.clone(), value.clone());
        }
    }

    /// One page of `matching` items in key order, resuming after `start_from`.
    fn page(
        &self,
        matches: impl Fn(&Item) -> bool,
        direction: SortDirection,
        start_from: Option<&ContinuationToken>,
        projection: Option<&Projection>,
        page_size: Option<usize>,
    ) -> Result<Page> {
        let start = start_from
            .map(|token| self.stored_key_of(token.as_item()))
            .transpose()?;

        let mut entries: Vec<(&StoredKey, &Item)> = self.items.iter().collect();
        if !direction.is_forward() {
            entries.reverse();
        }

        let mut remaining = entries
            .into_iter()
            .filter(|(key, _)| match &start {
                Some(start) if direction.is_forward() => *key > start,
                Some(start) => *key < start,
                None => true,
            })
            .filter(|(_, item)| matches(*item))
            .peekable();

        let limit = page_size.unwrap_or(usize::MAX);
        let mut items = Vec::new();
        let mut last_key = None;

        while items.len() < limit {
            let Some((_, item)) = remaining.next() else {
                break;
            };
            last_key = Some(self.schema.key_from_item(item)?);
            items.push(match projection {
                Some(projection) => projection.apply(item),
                None => item.clone(),
            });
        }

        let next = match (remaining.peek(), last_key) {
            (Some(_), Some(key)) => Some(ContinuationToken::from_item(key.to_item())),
            _ => None,
        };

        Ok(Page {
            count: items.len(),
            items,
            next,
        })
    }
}

/// In-memory [`ItemStore`] with DynamoDB-like semantics.
///
/// Tables must be declared with their key schema. Queries support key equality
/// conditions only; filters and secondary indexes are rejected as unsupported.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<HashMap<String, Table>>>,
    page_size: Option<usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tables<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = (S, KeySchema)>,
        S: Into<String>,
    {
        let tables = tables
            .into_iter()
            .map(|(name, schema)| {
                (
                    name.into(),
                    Table {
                        schema,
                        items: BTreeMap::new(),
                    },
                )
            })
            .collect();

        Self {
            tables: Arc::new(RwLock::new(tables)),
            page_size: None,
        }
    }

    /// Caps the number of items per query or scan page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size.max(1));
        self
    }

    /// Declares a table; an existing table of the same name is kept.
    pub async fn create_table(&self, name: impl Into<String>, schema: KeySchema) {
        let mut tables = self.tables.write().await;
        tables.entry(name.into()).or_insert_with(|| Table {
            schema,
            items: BTreeMap::new(),
        });
    }
}

fn table<'a>(tables: &'a HashMap<String, Table>, name: &str) -> Result<&'a Table> {
    tables
        .get(name)
        .ok_or_else(|| StoreError::RequestFailed(format!("Table not found: {name}")))
}

fn table_mut<'a>(tables: &'a mut HashMap<String, Table>, name: &str) -> Result<&'a mut Table> {
    tables
        .get_mut(name)
        .ok_or_else(|| StoreError::RequestFailed(format!("Table not found: {name}")))
}

fn reject_unsupported(index_name: Option<&String>, filter: Option<&String>) -> Result<()> {
    if let Some(index) = index_name {
        return Err(StoreError::Unsupported(format!("secondary index '{index}'")));
    }
    if filter.is_some() {
        return Err(StoreError::Unsupported("filter expressions".to_string()));
    }
    Ok(())
}

#[async_trait]
impl ItemStore for InMemoryStore {
    async fn get_item(
        &self,
        table_name: &str,
        key: &Key,
        projection: Option<&Projection>,
    ) -> Result<Option<Item>> {
        let tables = self.tables.read().await;
        let table = table(&tables, table_name)?;
        let stored = table.stored_key(key)?;

        Ok(table.items.get(&stored).map(|item| match projection {
            Some(projection) => projection.apply(item),
            None => item.clone(),
        }))
    }

    async fn put_item(&self, table_name: &str, item: &Item) -> Result<()> {
        let mut tables = self.tables.write().await;
        let table = table_mut(&mut tables, table_name)?;
        let stored = table.stored_key_of(item)?;

        table.items.insert(stored, item.clone());
        Ok(())
    }

    async fn update_item(&self, table_name: &str, key: &Key, update: &UpdateExpression) -> Result<()> {
        let mut tables = self.tables.write().await;
        let table = table_mut(&mut tables, table_name)?;
        let stored = table.stored_key(key)?;
        table.reject_key_attributes(update.attributes())?;

        table.apply_update(stored, key, update.attributes());
        Ok(())
    }

    async fn delete_item(&self, table_name: &str, key: &Key) -> Result<()> {
        let mut tables = self.tables.write().await;
        let table = table_mut(&mut tables, table_name)?;
        let stored = table.stored_key(key)?;

        table.items.remove(&stored);
        Ok(())
    }

    async fn query(
        &self,
        table_name: &str,
        condition: &KeyCondition,
        options: &QueryOptions,
    ) -> Result<Page> {
        RenderedRead::query(condition, options)?;
        reject_unsupported(options.index_name.as_ref(), options.filter_expression.as_ref())?;

        let tables = self.tables.read().await;
        let table = table(&tables, table_name)?;

        table.page(
            |item| {
                condition
                    .equalities()
                    .iter()
                    .all(|(name, value)| item.get(name) == Some(value))
            },
            options.direction.unwrap_or_default(),
            options.start_from.as_ref(),
            options.projection.as_ref(),
            self.page_size,
        )
    }

    async fn scan(&self, table_name: &str, options: &ScanOptions) -> Result<Page> {
        RenderedRead::scan(options)?;
        reject_unsupported(options.index_name.as_ref(), options.filter_expression.as_ref())?;

        let tables = self.tables.read().await;
        let table = table(&tables, table_name)?;

        table.page(
            |_| true,
            SortDirection::Ascending,
            options.start_from.as_ref(),
            options.projection.as_ref(),
            self.page_size,
        )
    }

    /// Validates every write before applying any. Two writes to the same item
    /// cancel the transaction.
    async fn transact_write(&self, items: &[TransactItem]) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let mut seen = HashSet::new();
        let mut planned = Vec::with_capacity(items.len());

        for write in items {
            let table = table(&tables, write.table())?;
            let stored = match write {
                TransactItem::Put { item, .. } => table.stored_key_of(item)?,
                TransactItem::Update { key, attributes, .. } => {
                    if attributes.is_empty() {
                        return Err(StoreError::EmptyUpdate);
                    }
                    table.reject_key_attributes(attributes)?;
                    table.stored_key(key)?
                }
                TransactItem::Delete { key, .. } => table.stored_key(key)?,
            };

            if !seen.insert((write.table().to_string(), stored.clone())) {
                tracing::warn!(table = write.table(), "Transaction touches the same item twice");
                return Ok(false);
            }
            planned.push(stored);
        }

        for (write, stored) in items.iter().zip(planned) {
            let table = table_mut(&mut tables, write.table())?;
            match write {
                TransactItem::Put { item, .. } => {
                    table.items.insert(stored, item.clone());
                }
                TransactItem::Update { key, attributes, .. } => {
                    table.apply_update(stored, key, attributes);
                }
                TransactItem::Delete { .. } => {
                    table.items.remove(&stored);
                }
            }
        }

        Ok(true)
    }
}
