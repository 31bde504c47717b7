use std::str::FromStr;

use serde_json::{Map, Value};

use crate::item::Number;

use super::{Field, FieldType, RequestBody, Schema, Violation};

/// Validates `input` against `schema`.
///
/// Returns the coerced object holding only the declared fields, or every violation
/// found. Optional fields may be absent or `null`.
pub fn validate(schema: &Schema, input: &Value) -> Result<Map<String, Value>, Vec<Violation>> {
    let mut violations = Vec::new();

    match validate_object(schema, input, "", &mut violations) {
        Some(object) if violations.is_empty() => Ok(object),
        _ => Err(violations),
    }
}

/// Validates `input` against `T::schema()` and deserializes the coerced object.
pub fn parse_body<T: RequestBody>(input: &Value) -> Result<T, Vec<Violation>> {
    let object = validate(&T::schema(), input)?;

    serde_json::from_value(Value::Object(object))
        .map_err(|error| vec![Violation::new("", error.to_string())])
}

/// Joins violations as `"<path> <message>"` separated by `". "`.
pub fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join(". ")
}

fn validate_object(
    schema: &Schema,
    input: &Value,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Option<Map<String, Value>> {
    let Some(object) = input.as_object() else {
        violations.push(Violation::new(path, "Input should be a valid dictionary"));
        return None;
    };

    let mut output = Map::new();

    for field in schema.fields() {
        let field_path = join_path(path, &field.name);

        match object.get(&field.name) {
            None if field.required => {
                violations.push(Violation::new(field_path, "Field required"));
            }
            None => {}
            Some(Value::Null) if !field.required => {
                output.insert(field.name.clone(), Value::Null);
            }
            Some(value) => {
                if let Some(coerced) = validate_field(field, value, &field_path, violations) {
                    output.insert(field.name.clone(), coerced);
                }
            }
        }
    }

    Some(output)
}

fn validate_field(
    field: &Field,
    value: &Value,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Option<Value> {
    let coerced = coerce(&field.ty, value, path, violations)?;

    if let Some(literals) = &field.literals {
        let matches = coerced
            .as_str()
            .is_some_and(|text| literals.iter().any(|literal| literal == text));
        if !matches {
            violations.push(Violation::new(
                path,
                format!("Input should be {}", expected_literals(literals)),
            ));
            return None;
        }
    }

    if let (Some(min_length), Some(text)) = (field.min_length, coerced.as_str()) {
        if text.chars().count() < min_length {
            let unit = if min_length == 1 { "character" } else { "characters" };
            violations.push(Violation::new(
                path,
                format!("String should have at least {min_length} {unit}"),
            ));
            return None;
        }
    }

    Some(coerced)
}

fn coerce(
    ty: &FieldType,
    value: &Value,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Option<Value> {
    let result = match ty {
        FieldType::String => match value {
            Value::String(_) => Ok(value.clone()),
            _ => Err("Input should be a valid string"),
        },
        FieldType::Integer => coerce_integer(value).map(Value::from),
        FieldType::Number => coerce_number(value).map(Value::Number),
        FieldType::Boolean => coerce_boolean(value).map(Value::Bool),
        FieldType::Identifier => match value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(_) => coerce_integer(value).map(Value::from),
            _ => Err("Input should be a valid string or integer"),
        },
        FieldType::List(item_type) => {
            let Value::Array(values) = value else {
                violations.push(Violation::new(path, "Input should be a valid list"));
                return None;
            };

            let before = violations.len();
            let items: Vec<Value> = values
                .iter()
                .enumerate()
                .filter_map(|(index, item)| {
                    coerce(item_type, item, &join_path(path, &index.to_string()), violations)
                })
                .collect();

            return (violations.len() == before).then_some(Value::Array(items));
        }
        FieldType::Object(schema) => {
            let before = violations.len();
            let object = validate_object(schema, value, path, violations)?;
            return (violations.len() == before).then_some(Value::Object(object));
        }
        FieldType::Any => Ok(value.clone()),
    };

    match result {
        Ok(coerced) => Some(coerced),
        Err(message) => {
            violations.push(Violation::new(path, message));
            None
        }
    }
}

fn coerce_integer(value: &Value) -> Result<i64, &'static str> {
    match value {
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                return Ok(integer);
            }
            match number.as_f64() {
                Some(float) if float.is_finite() && float.fract() != 0.0 => {
                    Err("Input should be a valid integer, got a number with a fractional part")
                }
                Some(float) if float.abs() < i64::MAX as f64 => Ok(float as i64),
                Some(_) => Err("Input integer is out of range"),
                None => Err("Input should be a valid integer"),
            }
        }
        Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| "Input should be a valid integer, unable to parse string as an integer"),
        _ => Err("Input should be a valid integer"),
    }
}

fn coerce_number(value: &Value) -> Result<serde_json::Number, &'static str> {
    match value {
        Value::Number(number) => Ok(number.clone()),
        Value::String(text) => Number::parse(text.trim())
            .ok()
            .and_then(|number| serde_json::Number::from_str(number.as_str()).ok())
            .ok_or("Input should be a valid number, unable to parse string as a number"),
        _ => Err("Input should be a valid number"),
    }
}

fn coerce_boolean(value: &Value) -> Result<bool, &'static str> {
    const INVALID: &str = "Input should be a valid boolean, unable to interpret input";

    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(INVALID),
        },
        Value::String(text) => match text.to_ascii_lowercase().as_str() {
            "1" | "on" | "t" | "true" | "y" | "yes" => Ok(true),
            "0" | "off" | "f" | "false" | "n" | "no" => Ok(false),
            _ => Err(INVALID),
        },
        _ => Err("Input should be a valid boolean"),
    }
}

fn expected_literals(literals: &[String]) -> String {
    let quoted: Vec<String> = literals.iter().map(|literal| format!("'{literal}'")).collect();

    match quoted.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} or {last}", rest.join(", ")),
    }
}

fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}
