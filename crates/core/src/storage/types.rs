use indexmap::IndexMap;

use crate::item::{AttributeValue, Item, Key};

use super::Projection;

/// Opaque cursor returned by a paged read when more results remain.
///
/// It must be handed back unchanged to resume the read.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuationToken(Item);

impl ContinuationToken {
    pub fn from_item(item: Item) -> Self {
        Self(item)
    }

    pub fn as_item(&self) -> &Item {
        &self.0
    }

    pub fn into_item(self) -> Item {
        self.0
    }
}

/// Sort order of a query over the sort key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn is_forward(self) -> bool {
        matches!(self, Self::Ascending)
    }
}

/// Options accepted by a single query page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub index_name: Option<String>,
    pub filter_expression: Option<String>,
    pub projection: Option<Projection>,
    pub attribute_names: IndexMap<String, String>,
    pub attribute_values: Item,
    pub start_from: Option<ContinuationToken>,
    pub direction: Option<SortDirection>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    pub fn filter(mut self, expression: impl Into<String>) -> Self {
        self.filter_expression = Some(expression.into());
        self
    }

    pub fn project(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn name(mut self, placeholder: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.attribute_names
            .insert(placeholder.into(), attribute.into());
        self
    }

    pub fn value(mut self, placeholder: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attribute_values.insert(placeholder.into(), value.into());
        self
    }

    pub fn start_from(mut self, token: ContinuationToken) -> Self {
        self.start_from = Some(token);
        self
    }

    pub fn direction(mut self, direction: SortDirection) -> Self {
        self.direction = Some(direction);
        self
    }
}

/// Options accepted by a single scan page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOptions {
    pub index_name: Option<String>,
    pub filter_expression: Option<String>,
    pub projection: Option<Projection>,
    pub attribute_names: IndexMap<String, String>,
    pub attribute_values: Item,
    pub start_from: Option<ContinuationToken>,
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    pub fn filter(mut self, expression: impl Into<String>) -> Self {
        self.filter_expression = Some(expression.into());
        self
    }

    pub fn project(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn name(mut self, placeholder: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.attribute_names
            .insert(placeholder.into(), attribute.into());
        self
    }

    pub fn value(mut self, placeholder: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attribute_values.insert(placeholder.into(), value.into());
        self
    }

    pub fn start_from(mut self, token: ContinuationToken) -> Self {
        self.start_from = Some(token);
        self
    }
}

/// One page of a query or scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Item>,
    pub count: usize,
    /// Present iff more pages exist.
    pub next: Option<ContinuationToken>,
}

/// Every page of a read, concatenated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collected {
    pub items: Vec<Item>,
    pub count: usize,
}

impl Collected {
    /// Appends a page, returning its continuation token.
    pub fn absorb(&mut self, page: Page) -> Option<ContinuationToken> {
        self.items.extend(page.items);
        self.count += page.count;
        page.next
    }
}

/// A single write applied atomically together with the rest of its slice.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactItem {
    Put { table: String, item: Item },
    Update { table: String, key: Key, attributes: Item },
    Delete { table: String, key: Key },
}

impl TransactItem {
    pub fn table(&self) -> &str {
        match self {
            Self::Put { table, .. } | Self::Update { table, .. } | Self::Delete { table, .. } => {
                table
            }
        }
    }
}
