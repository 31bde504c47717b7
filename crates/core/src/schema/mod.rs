//! Declarative request schemas and the generic validator that applies them.

mod types;
mod validate;

pub use types::{Field, FieldType, RequestBody, Schema, Violation};
pub use validate::{format_violations, parse_body, validate};
