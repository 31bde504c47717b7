//! The transport envelope every handler returns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const ALLOW_HEADERS: &str =
    "Content-Type,Authorization,Accept,Accept-Encoding,Connection,x-api-key,clientKey,clientSecret";
pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "OPTIONS,POST,GET,PUT,PATCH,DELETE,HEAD";
pub const MAX_AGE: &str = "86400";

/// An API gateway proxy response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    /// Serialized JSON.
    pub body: String,
    pub headers: BTreeMap<String, String>,
    pub is_base64_encoded: bool,
}

impl ResponseEnvelope {
    /// Builds an envelope, substituting the default body of `status_code` when `body`
    /// is absent.
    pub fn new(status_code: u16, body: Option<&Value>) -> Self {
        let body = match body {
            Some(body) => body.to_string(),
            None => default_body(status_code)
                .map(|body| body.to_string())
                .unwrap_or_else(|| Value::Null.to_string()),
        };

        Self {
            status_code,
            body,
            headers: cors_headers(),
            is_base64_encoded: false,
        }
    }

    /// Parses the body back into JSON.
    pub fn json_body(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.body)
    }
}

/// The four CORS headers attached to every envelope.
pub fn cors_headers() -> BTreeMap<String, String> {
    [
        ("Access-Control-Allow-Headers", ALLOW_HEADERS),
        ("Access-Control-Allow-Origin", ALLOW_ORIGIN),
        ("Access-Control-Allow-Methods", ALLOW_METHODS),
        ("Access-Control-Max-Age", MAX_AGE),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}

/// Body used when a response of `status_code` carries none.
pub fn default_body(status_code: u16) -> Option<Value> {
    let error = match status_code {
        400 => "Invalid request",
        404 => "Resource not found",
        406 => "Invalid input",
        500 => "An unexpected error occurred. Contact support",
        _ => return None,
    };
    Some(json!({ "error": error }))
}

/// `{success: true, message, data}`
pub fn success_body(message: &str, data: Value) -> Value {
    json!({
        "success": true,
        "message": message,
        "data": data,
    })
}

/// `{success: false, error, data?}`; `data` is omitted when absent or empty.
pub fn failure_body(error: &str, data: Option<Value>) -> Value {
    let mut body = json!({
        "success": false,
        "error": error,
    });
    if let Some(data) = data.filter(|data| !is_empty_data(data)) {
        body["data"] = data;
    }
    body
}

/// Null, `false`, zero, `""`, `[]` and `{}` carry nothing worth reporting.
fn is_empty_data(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}
