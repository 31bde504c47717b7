//! Conversion between the store-neutral item model and DynamoDB attribute maps.
//!
//! Pure functions, testable without DynamoDB access.

use std::collections::HashMap;

use appointsync_core::item::{AttributeValue, Item, Key, Number};
use appointsync_core::storage::{Result, StoreError};
use aws_sdk_dynamodb::types::AttributeValue as DynamoValue;

pub type DynamoItem = HashMap<String, DynamoValue>;

pub fn value_to_dynamo(value: &AttributeValue) -> DynamoValue {
    match value {
        AttributeValue::S(s) => DynamoValue::S(s.clone()),
        AttributeValue::N(n) => DynamoValue::N(n.as_str().to_string()),
        AttributeValue::Bool(b) => DynamoValue::Bool(*b),
        AttributeValue::Null => DynamoValue::Null(true),
        AttributeValue::M(map) => DynamoValue::M(item_to_dynamo(map)),
        AttributeValue::L(values) => DynamoValue::L(values.iter().map(value_to_dynamo).collect()),
    }
}

pub fn item_to_dynamo(item: &Item) -> DynamoItem {
    item.iter()
        .map(|(name, value)| (name.clone(), value_to_dynamo(value)))
        .collect()
}

pub fn key_to_dynamo(key: &Key) -> DynamoItem {
    key.pairs()
        .map(|(name, value)| (name.to_string(), DynamoValue::S(value.to_string())))
        .collect()
}

/// String and number sets come back as lists. Binary attributes are rejected.
pub fn value_from_dynamo(value: &DynamoValue) -> Result<AttributeValue> {
    match value {
        DynamoValue::S(s) => Ok(AttributeValue::S(s.clone())),
        DynamoValue::N(n) => Ok(AttributeValue::N(Number::parse(n)?)),
        DynamoValue::Bool(b) => Ok(AttributeValue::Bool(*b)),
        DynamoValue::Null(_) => Ok(AttributeValue::Null),
        DynamoValue::M(map) => Ok(AttributeValue::M(item_from_dynamo(map)?)),
        DynamoValue::L(values) => values
            .iter()
            .map(value_from_dynamo)
            .collect::<Result<Vec<_>>>()
            .map(AttributeValue::L),
        DynamoValue::Ss(values) => Ok(AttributeValue::L(
            values.iter().cloned().map(AttributeValue::S).collect(),
        )),
        DynamoValue::Ns(values) => values
            .iter()
            .map(|n| Number::parse(n).map(AttributeValue::N))
            .collect::<Result<Vec<_>>>()
            .map(AttributeValue::L),
        DynamoValue::B(_) | DynamoValue::Bs(_) => Err(StoreError::InvalidData(
            "binary attributes are not supported".to_string(),
        )),
        other => Err(StoreError::InvalidData(format!(
            "unknown attribute type: {other:?}"
        ))),
    }
}

/// Attribute order of a DynamoDB map is unspecified; names are sorted so results
/// are stable.
pub fn item_from_dynamo(item: &DynamoItem) -> Result<Item> {
    let mut names: Vec<&String> = item.keys().collect();
    names.sort();

    names
        .into_iter()
        .map(|name| Ok((name.clone(), value_from_dynamo(&item[name])?)))
        .collect()
}

pub fn placeholder_values_to_dynamo(values: &Item) -> Option<DynamoItem> {
    if values.is_empty() {
        None
    } else {
        Some(item_to_dynamo(values))
    }
}

pub fn placeholder_names_to_dynamo(
    names: &indexmap::IndexMap<String, String>,
) -> Option<HashMap<String, String>> {
    if names.is_empty() {
        None
    } else {
        Some(names.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}
