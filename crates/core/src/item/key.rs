use super::{AttributeValue, Item};
use crate::storage::{Result, StoreError};

/// The key shape of a table: a partition key attribute and an optional sort key
/// attribute, both string-typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchema {
    pub partition_key: String,
    pub sort_key: Option<String>,
}

impl KeySchema {
    pub fn new(partition_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: None,
        }
    }

    pub fn with_sort_key(mut self, sort_key: impl Into<String>) -> Self {
        self.sort_key = Some(sort_key.into());
        self
    }

    /// Attribute names making up the key, partition key first.
    pub fn attribute_names(&self) -> Vec<&str> {
        let mut names = vec![self.partition_key.as_str()];
        if let Some(sort_key) = &self.sort_key {
            names.push(sort_key);
        }
        names
    }

    /// Extracts the key of `item`.
    ///
    /// Every key attribute must be present and hold a string.
    pub fn key_from_item(&self, item: &Item) -> Result<Key> {
        let partition = string_attribute(item, &self.partition_key)?;
        let mut key = Key::partition(&self.partition_key, partition);

        if let Some(sort_key) = &self.sort_key {
            let sort = string_attribute(item, sort_key)?;
            key = key.with_sort(sort_key, sort);
        }

        Ok(key)
    }

    /// Checks that `key` names exactly the attributes of this schema.
    pub fn check(&self, key: &Key) -> Result<()> {
        if key.partition.0 != self.partition_key {
            return Err(StoreError::InvalidKey(format!(
                "expected partition key '{}', got '{}'",
                self.partition_key, key.partition.0
            )));
        }

        match (&self.sort_key, &key.sort) {
            (None, None) => Ok(()),
            (Some(expected), Some((name, _))) if expected == name => Ok(()),
            (Some(expected), Some((name, _))) => Err(StoreError::InvalidKey(format!(
                "expected sort key '{expected}', got '{name}'"
            ))),
            (Some(expected), None) => Err(StoreError::InvalidKey(format!(
                "missing sort key '{expected}'"
            ))),
            (None, Some((name, _))) => Err(StoreError::InvalidKey(format!(
                "unexpected sort key '{name}'"
            ))),
        }
    }
}

fn string_attribute(item: &Item, name: &str) -> Result<String> {
    match item.get(name) {
        Some(AttributeValue::S(value)) => Ok(value.clone()),
        Some(other) => Err(StoreError::InvalidKey(format!(
            "key attribute '{name}' must be a string, got {}",
            other.type_name()
        ))),
        None => Err(StoreError::InvalidKey(format!(
            "missing key attribute '{name}'"
        ))),
    }
}

/// The concrete key of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    partition: (String, String),
    sort: Option<(String, String)>,
}

impl Key {
    pub fn partition(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            partition: (name.into(), value.into()),
            sort: None,
        }
    }

    pub fn with_sort(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.sort = Some((name.into(), value.into()));
        self
    }

    pub fn partition_value(&self) -> &str {
        &self.partition.1
    }

    pub fn sort_value(&self) -> Option<&str> {
        self.sort.as_ref().map(|(_, value)| value.as_str())
    }

    /// `(name, value)` pairs, partition key first.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        std::iter::once((self.partition.0.as_str(), self.partition.1.as_str())).chain(
            self.sort
                .as_ref()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        )
    }

    pub fn to_item(&self) -> Item {
        self.pairs()
            .map(|(name, value)| (name.to_string(), AttributeValue::from(value)))
            .collect()
    }
}
