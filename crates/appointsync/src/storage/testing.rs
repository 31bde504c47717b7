//! Store double for tests: records calls, injects failures and scripts transaction
//! outcomes, delegating everything else to an [`InMemoryStore`].

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use appointsync_core::item::{Item, Key};
use appointsync_core::storage::{
    ItemStore, KeyCondition, Page, Projection, QueryOptions, Result, ScanOptions, StoreError,
    TransactItem, UpdateExpression,
};

use super::inmemory::InMemoryStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetItem { projection: Option<Vec<String>> },
    PutItem,
    UpdateItem { expression: String },
    DeleteItem,
    Query,
    Scan,
    TransactWrite { size: usize },
}

pub struct ScriptedStore {
    inner: InMemoryStore,
    calls: Mutex<Vec<Call>>,
    fail_on: Option<(usize, StoreError)>,
    fail_always: Option<StoreError>,
    transact_outcomes: Mutex<VecDeque<Result<bool>>>,
    pages: Mutex<VecDeque<Page>>,
}

impl ScriptedStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            fail_on: None,
            fail_always: None,
            transact_outcomes: Mutex::new(VecDeque::new()),
            pages: Mutex::new(VecDeque::new()),
        }
    }

    /// Every call fails with `error`.
    pub fn failing(error: StoreError) -> Self {
        let mut store = Self::new(InMemoryStore::new());
        store.fail_always = Some(error);
        store
    }

    /// The `n`th call (1-based) fails with `error`.
    pub fn fail_on_call(mut self, n: usize, error: StoreError) -> Self {
        self.fail_on = Some((n, error));
        self
    }

    /// Outcomes returned by successive `transact_write` calls.
    pub fn with_transact_outcomes(self, outcomes: Vec<Result<bool>>) -> Self {
        *self.transact_outcomes.lock().unwrap() = outcomes.into();
        self
    }

    /// Pages returned by successive `query` or `scan` calls, ignoring the request.
    pub fn with_pages(self, pages: Vec<Page>) -> Self {
        *self.pages.lock().unwrap() = pages.into();
        self
    }

    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<()> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(call);

        if let Some(error) = &self.fail_always {
            return Err(error.clone());
        }
        match &self.fail_on {
            Some((n, error)) if *n == calls.len() => Err(error.clone()),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ItemStore for ScriptedStore {
    async fn get_item(
        &self,
        table: &str,
        key: &Key,
        projection: Option<&Projection>,
    ) -> Result<Option<Item>> {
        self.record(Call::GetItem {
            projection: projection.map(|p| p.attributes().to_vec()),
        })?;
        self.inner.get_item(table, key, projection).await
    }

    async fn put_item(&self, table: &str, item: &Item) -> Result<()> {
        self.record(Call::PutItem)?;
        self.inner.put_item(table, item).await
    }

    async fn update_item(&self, table: &str, key: &Key, update: &UpdateExpression) -> Result<()> {
        self.record(Call::UpdateItem {
            expression: update.expression().to_string(),
        })?;
        self.inner.update_item(table, key, update).await
    }

    async fn delete_item(&self, table: &str, key: &Key) -> Result<()> {
        self.record(Call::DeleteItem)?;
        self.inner.delete_item(table, key).await
    }

    async fn query(
        &self,
        table: &str,
        condition: &KeyCondition,
        options: &QueryOptions,
    ) -> Result<Page> {
        self.record(Call::Query)?;
        let scripted = self.pages.lock().unwrap().pop_front();
        match scripted {
            Some(page) => Ok(page),
            None => self.inner.query(table, condition, options).await,
        }
    }

    async fn scan(&self, table: &str, options: &ScanOptions) -> Result<Page> {
        self.record(Call::Scan)?;
        let scripted = self.pages.lock().unwrap().pop_front();
        match scripted {
            Some(page) => Ok(page),
            None => self.inner.scan(table, options).await,
        }
    }

    async fn transact_write(&self, items: &[TransactItem]) -> Result<bool> {
        self.record(Call::TransactWrite { size: items.len() })?;
        let scripted = self.transact_outcomes.lock().unwrap().pop_front();
        match scripted {
            Some(outcome) => outcome,
            None => self.inner.transact_write(items).await,
        }
    }
}
