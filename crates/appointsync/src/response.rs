//! Envelope constructors used by every handler.

use appointsync_core::response::{failure_body, success_body, ResponseEnvelope};
use serde_json::Value;

/// Builds an envelope; any status of 400 or above is logged at warn level.
pub fn make_response(status_code: u16, body: Option<Value>) -> ResponseEnvelope {
    let envelope = ResponseEnvelope::new(status_code, body.as_ref());

    if status_code >= 400 {
        tracing::warn!(status_code, envelope = ?envelope, "Error response");
    }

    envelope
}

pub fn ok(message: &str, data: Value) -> ResponseEnvelope {
    make_response(200, Some(success_body(message, data)))
}

pub fn bad_request(error: &str, data: Option<Value>) -> ResponseEnvelope {
    make_response(400, Some(failure_body(error, data)))
}

pub fn not_found(error: &str, data: Option<Value>) -> ResponseEnvelope {
    make_response(404, Some(failure_body(error, data)))
}

pub fn not_acceptable(error: &str, data: Option<Value>) -> ResponseEnvelope {
    make_response(406, Some(failure_body(error, data)))
}

pub fn internal_server_error(error: &str, data: Option<Value>) -> ResponseEnvelope {
    make_response(500, Some(failure_body(error, data)))
}
