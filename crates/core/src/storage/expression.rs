//! Rendering of update, key-condition and projection expressions.
//!
//! Attribute names are never written into an expression directly. Each one is aliased
//! through a generated `#` placeholder and each value through a `:` placeholder, so
//! reserved words and names with punctuation are always safe.

use indexmap::IndexMap;

use crate::item::{AttributeValue, Item, Key};

use super::{QueryOptions, Result, ScanOptions, StoreError};

/// Name and value placeholder maps attached to an expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placeholders {
    pub names: IndexMap<String, String>,
    pub values: Item,
}

impl Placeholders {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.values.is_empty()
    }

    /// Adds the entries of `names` and `values`.
    ///
    /// A placeholder that is already defined is rejected.
    pub fn merge(&mut self, names: &IndexMap<String, String>, values: &Item) -> Result<()> {
        for (placeholder, name) in names {
            if self.names.contains_key(placeholder) {
                return Err(StoreError::PlaceholderCollision(placeholder.clone()));
            }
            self.names.insert(placeholder.clone(), name.clone());
        }
        for (placeholder, value) in values {
            if self.values.contains_key(placeholder) {
                return Err(StoreError::PlaceholderCollision(placeholder.clone()));
            }
            self.values.insert(placeholder.clone(), value.clone());
        }
        Ok(())
    }
}

/// A `SET` expression assigning every attribute of an item.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    expression: String,
    placeholders: Placeholders,
    attributes: Item,
}

impl UpdateExpression {
    /// Builds `SET #u0 = :u0, #u1 = :u1, ...`, one pair per attribute in insertion order.
    pub fn set(attributes: &Item) -> Result<Self> {
        if attributes.is_empty() {
            return Err(StoreError::EmptyUpdate);
        }

        let mut placeholders = Placeholders::default();
        let mut assignments = Vec::with_capacity(attributes.len());

        for (index, (name, value)) in attributes.iter().enumerate() {
            let name_placeholder = format!("#u{index}");
            let value_placeholder = format!(":u{index}");

            assignments.push(format!("{name_placeholder} = {value_placeholder}"));
            placeholders.names.insert(name_placeholder, name.clone());
            placeholders.values.insert(value_placeholder, value.clone());
        }

        Ok(Self {
            expression: format!("SET {}", assignments.join(", ")),
            placeholders,
            attributes: attributes.clone(),
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn placeholders(&self) -> &Placeholders {
        &self.placeholders
    }

    /// The assigned attributes, in expression order.
    pub fn attributes(&self) -> &Item {
        &self.attributes
    }
}

/// A conjunction of equalities over key (or index key) attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyCondition {
    equalities: Vec<(String, AttributeValue)>,
}

impl KeyCondition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.equalities.push((name.into(), value.into()));
        self
    }

    /// Matches exactly the item with `key`.
    pub fn from_key(key: &Key) -> Self {
        key.pairs()
            .fold(Self::new(), |condition, (name, value)| condition.eq(name, value))
    }

    pub fn equalities(&self) -> &[(String, AttributeValue)] {
        &self.equalities
    }

    /// Renders `#k0 = :k0 AND #k1 = :k1 ...`.
    pub fn render(&self) -> Result<(String, Placeholders)> {
        if self.equalities.is_empty() {
            return Err(StoreError::EmptyKeyCondition);
        }

        let mut placeholders = Placeholders::default();
        let mut clauses = Vec::with_capacity(self.equalities.len());

        for (index, (name, value)) in self.equalities.iter().enumerate() {
            let name_placeholder = format!("#k{index}");
            let value_placeholder = format!(":k{index}");

            clauses.push(format!("{name_placeholder} = {value_placeholder}"));
            placeholders.names.insert(name_placeholder, name.clone());
            placeholders.values.insert(value_placeholder, value.clone());
        }

        Ok((clauses.join(" AND "), placeholders))
    }
}

/// The subset of attributes a read returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection(Vec<String>);

impl Projection {
    pub fn of<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(attributes.into_iter().map(Into::into).collect())
    }

    /// Projects only the key attributes.
    pub fn key_only(key: &Key) -> Self {
        Self::of(key.pairs().map(|(name, _)| name))
    }

    pub fn attributes(&self) -> &[String] {
        &self.0
    }

    /// Keeps only the projected attributes of `item`.
    pub fn apply(&self, item: &Item) -> Item {
        item.iter()
            .filter(|(name, _)| self.0.contains(*name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Renders `#p0, #p1, ...` and its name placeholders.
    pub fn render(&self) -> (String, IndexMap<String, String>) {
        let mut names = IndexMap::with_capacity(self.0.len());
        let mut parts = Vec::with_capacity(self.0.len());

        for (index, attribute) in self.0.iter().enumerate() {
            let placeholder = format!("#p{index}");
            parts.push(placeholder.clone());
            names.insert(placeholder, attribute.clone());
        }

        (parts.join(", "), names)
    }
}

/// Expressions and placeholders of one query or scan request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedRead {
    pub key_condition: Option<String>,
    pub filter_expression: Option<String>,
    pub projection: Option<String>,
    pub placeholders: Placeholders,
}

impl RenderedRead {
    pub fn query(condition: &KeyCondition, options: &QueryOptions) -> Result<Self> {
        let (key_condition, mut placeholders) = condition.render()?;
        let projection = render_projection(options.projection.as_ref(), &mut placeholders)?;

        placeholders.merge(&options.attribute_names, &options.attribute_values)?;

        Ok(Self {
            key_condition: Some(key_condition),
            filter_expression: options.filter_expression.clone(),
            projection,
            placeholders,
        })
    }

    pub fn scan(options: &ScanOptions) -> Result<Self> {
        let mut placeholders = Placeholders::default();
        let projection = render_projection(options.projection.as_ref(), &mut placeholders)?;

        placeholders.merge(&options.attribute_names, &options.attribute_values)?;

        Ok(Self {
            key_condition: None,
            filter_expression: options.filter_expression.clone(),
            projection,
            placeholders,
        })
    }
}

fn render_projection(
    projection: Option<&Projection>,
    placeholders: &mut Placeholders,
) -> Result<Option<String>> {
    match projection {
        Some(projection) => {
            let (expression, names) = projection.render();
            placeholders.merge(&names, &Item::new())?;
            Ok(Some(expression))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attributes(pairs: &[(&str, AttributeValue)]) -> Item {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_update_has_one_placeholder_pair_per_attribute() {
        let attrs = attributes(&[
            ("status", "booked".into()),
            ("name", "Ada".into()),
            ("first-visit", true.into()),
        ]);

        let update = UpdateExpression::set(&attrs).unwrap();

        assert_eq!(update.expression(), "SET #u0 = :u0, #u1 = :u1, #u2 = :u2");
        assert_eq!(update.placeholders().names.len(), 3);
        assert_eq!(update.placeholders().values.len(), 3);
        assert_eq!(update.placeholders().names["#u0"], "status");
        assert_eq!(update.placeholders().names["#u2"], "first-visit");
        assert_eq!(update.placeholders().values[":u1"], AttributeValue::from("Ada"));
    }

    #[test]
    fn test_update_never_inlines_attribute_names() {
        let attrs = attributes(&[("size", 1_i64.into()), ("a.b", 2_i64.into())]);

        let update = UpdateExpression::set(&attrs).unwrap();

        assert!(!update.expression().contains("size"));
        assert!(!update.expression().contains("a.b"));
    }

    #[test]
    fn test_empty_update_is_rejected() {
        assert_eq!(UpdateExpression::set(&Item::new()), Err(StoreError::EmptyUpdate));
    }

    #[test]
    fn test_key_condition_renders_conjunction() {
        let condition = KeyCondition::new().eq("customerId", "42").eq("profile", "main");

        let (expression, placeholders) = condition.render().unwrap();

        assert_eq!(expression, "#k0 = :k0 AND #k1 = :k1");
        assert_eq!(placeholders.names["#k1"], "profile");
        assert_eq!(placeholders.values[":k0"], AttributeValue::from("42"));
    }

    #[test]
    fn test_empty_key_condition_is_rejected() {
        assert_eq!(
            KeyCondition::new().render(),
            Err(StoreError::EmptyKeyCondition)
        );
    }

    #[test]
    fn test_key_condition_from_key() {
        let key = Key::partition("pk", "A").with_sort("sk", "B");
        let condition = KeyCondition::from_key(&key);

        assert_eq!(
            condition.equalities(),
            &[
                ("pk".to_string(), AttributeValue::from("A")),
                ("sk".to_string(), AttributeValue::from("B"))
            ]
        );
    }

    #[test]
    fn test_projection_render_and_apply() {
        let projection = Projection::of(["pk", "name"]);
        let (expression, names) = projection.render();

        assert_eq!(expression, "#p0, #p1");
        assert_eq!(names["#p1"], "name");

        let item = attributes(&[
            ("pk", "A".into()),
            ("name", "Ada".into()),
            ("notes", "skip".into()),
        ]);
        let projected = projection.apply(&item);
        assert_eq!(projected.keys().collect::<Vec<_>>(), vec!["pk", "name"]);
    }

    #[test]
    fn test_query_merges_caller_placeholders() {
        let condition = KeyCondition::new().eq("pk", "A");
        let options = QueryOptions::new()
            .filter("#status = :status")
            .name("#status", "status")
            .value(":status", "active")
            .project(Projection::of(["pk"]));

        let read = RenderedRead::query(&condition, &options).unwrap();

        assert_eq!(read.key_condition.as_deref(), Some("#k0 = :k0"));
        assert_eq!(read.filter_expression.as_deref(), Some("#status = :status"));
        assert_eq!(read.projection.as_deref(), Some("#p0"));
        assert_eq!(
            read.placeholders.names.keys().collect::<Vec<_>>(),
            vec!["#k0", "#p0", "#status"]
        );
        assert_eq!(read.placeholders.values.len(), 2);
    }

    #[test]
    fn test_query_rejects_colliding_placeholder() {
        let condition = KeyCondition::new().eq("pk", "A");
        let options = QueryOptions::new().value(":k0", "mine");

        let result = RenderedRead::query(&condition, &options);

        assert_eq!(
            result,
            Err(StoreError::PlaceholderCollision(":k0".to_string()))
        );
    }

    #[test]
    fn test_scan_has_no_key_condition() {
        let read = RenderedRead::scan(&ScanOptions::new()).unwrap();

        assert!(read.key_condition.is_none());
        assert!(read.placeholders.is_empty());
    }
}
