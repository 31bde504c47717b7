use std::fmt;

use serde::de::DeserializeOwned;

/// Type expected for a field, with the coercions the validator applies.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    /// Integers, integral floats and integer strings.
    Integer,
    /// Numbers and numeric strings, kept exact.
    Number,
    /// Booleans, `0`/`1` and the usual textual spellings.
    Boolean,
    /// A string or an integer, kept as given.
    Identifier,
    List(Box<FieldType>),
    Object(Schema),
    Any,
}

/// One field of a [`Schema`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
    pub required: bool,
    /// Accepted literal values, when the field is an enumeration.
    pub literals: Option<Vec<String>>,
    pub min_length: Option<usize>,
}

impl Field {
    pub fn required(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
            literals: None,
            min_length: None,
        }
    }

    pub fn optional(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            required: false,
            ..Self::required(name, ty)
        }
    }

    pub fn one_of(mut self, literals: &[&str]) -> Self {
        self.literals = Some(literals.iter().map(|literal| literal.to_string()).collect());
        self
    }

    pub fn min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }
}

/// The fields of a request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

/// A request body type with a declared schema.
pub trait RequestBody: DeserializeOwned {
    fn schema() -> Schema;
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path of the offending field, empty for the body itself.
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{} {}", self.path, self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_field_copies_everything_but_required() {
        let field = Field::optional("notes", FieldType::String).min_length(1);

        assert!(!field.required);
        assert_eq!(field.name, "notes");
        assert_eq!(field.min_length, Some(1));
    }

    #[test]
    fn test_one_of_sets_literals() {
        let field = Field::required("action", FieldType::String).one_of(&["update", "reschedule"]);

        assert_eq!(
            field.literals,
            Some(vec!["update".to_string(), "reschedule".to_string()])
        );
    }

    #[test]
    fn test_violation_display() {
        assert_eq!(
            Violation::new("fields.0.id", "Field required").to_string(),
            "fields.0.id Field required"
        );
        assert_eq!(
            Violation::new("", "Input should be a valid dictionary").to_string(),
            "Input should be a valid dictionary"
        );
    }
}
