use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};

use crate::storage::StoreError;

/// A stored record: attribute names mapped to values, in insertion order.
pub type Item = IndexMap<String, AttributeValue>;

/// A decimal number kept as its literal text.
///
/// Stores accept numbers with more precision than `f64` can represent, so the value
/// is never routed through binary floating point.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Number(String);

impl Number {
    /// Parses a JSON number literal such as `19.99`, `-3` or `1.5e-3`.
    ///
    /// Accepts exactly what [`Serialize`] can write back.
    pub fn parse(text: &str) -> Result<Self, StoreError> {
        match serde_json::Number::from_str(text) {
            Ok(_) if text.trim() == text => Ok(Self(text.to_string())),
            _ => Err(StoreError::InvalidNumber(text.to_string())),
        }
    }

    /// The literal text, exactly as written or received.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Number {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Self(value.to_string())
    }
}

impl From<serde_json::Number> for Number {
    fn from(value: serde_json::Number) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde_json::Number::from_str(&self.0)
            .map_err(ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let number = serde_json::Number::deserialize(deserializer)?;
        Number::parse(&number.to_string()).map_err(de::Error::custom)
    }
}

/// A tagged attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    S(String),
    N(Number),
    Bool(bool),
    Null,
    M(Item),
    L(Vec<AttributeValue>),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::S(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Self::N(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Item> {
        match self {
            Self::M(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            Self::L(l) => Some(l),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short type tag used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::S(_) => "string",
            Self::N(_) => "number",
            Self::Bool(_) => "boolean",
            Self::Null => "null",
            Self::M(_) => "map",
            Self::L(_) => "list",
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::S(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::S(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::N(Number::from(value))
    }
}

impl From<Number> for AttributeValue {
    fn from(value: Number) -> Self {
        Self::N(value)
    }
}

impl From<Item> for AttributeValue {
    fn from(value: Item) -> Self {
        Self::M(value)
    }
}

impl From<Vec<AttributeValue>> for AttributeValue {
    fn from(value: Vec<AttributeValue>) -> Self {
        Self::L(value)
    }
}

impl From<serde_json::Value> for AttributeValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::N(Number::from(n)),
            Value::String(s) => Self::S(s),
            Value::Array(values) => Self::L(values.into_iter().map(Self::from).collect()),
            Value::Object(map) => Self::M(
                map.into_iter()
                    .map(|(name, value)| (name, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<AttributeValue> for serde_json::Value {
    fn from(value: AttributeValue) -> Self {
        use serde_json::Value;

        match value {
            AttributeValue::S(s) => Value::String(s),
            AttributeValue::N(n) => match serde_json::Number::from_str(n.as_str()) {
                Ok(number) => Value::Number(number),
                Err(_) => Value::String(n.into_string()),
            },
            AttributeValue::Bool(b) => Value::Bool(b),
            AttributeValue::Null => Value::Null,
            AttributeValue::M(map) => Value::Object(
                map.into_iter()
                    .map(|(name, value)| (name, Value::from(value)))
                    .collect(),
            ),
            AttributeValue::L(values) => Value::Array(values.into_iter().map(Value::from).collect()),
        }
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::S(s) => serializer.serialize_str(s),
            Self::N(n) => n.serialize(serializer),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Null => serializer.serialize_unit(),
            Self::M(map) => map.serialize(serializer),
            Self::L(values) => values.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}
