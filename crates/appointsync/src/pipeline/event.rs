use std::collections::HashMap;

use appointsync_core::appointments::Customer;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An API gateway REST proxy request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InboundEvent {
    pub resource: Option<String>,
    pub path: Option<String>,
    pub http_method: String,
    pub headers: Option<HashMap<String, String>>,
    pub query_string_parameters: Option<HashMap<String, String>>,
    pub body: Option<String>,
    pub is_base64_encoded: bool,
    pub request_context: Option<RequestContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestContext {
    /// Context attached by the gateway's custom authorizer.
    pub authorizer: Option<Map<String, Value>>,
    pub request_id: Option<String>,
}

impl InboundEvent {
    /// The body as text, decoded from base64 when flagged. `None` when absent or
    /// not valid UTF-8.
    pub fn body_text(&self) -> Option<String> {
        let body = self.body.as_ref()?;
        if !self.is_base64_encoded {
            return Some(body.clone());
        }

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(body)
            .ok()?;
        String::from_utf8(bytes).ok()
    }

    /// The customer identified by the authorizer; empty when there is none.
    pub fn customer(&self) -> Customer {
        self.request_context
            .as_ref()
            .and_then(|context| context.authorizer.as_ref())
            .map(Customer::from_authorizer)
            .unwrap_or_default()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_context
            .as_ref()
            .and_then(|context| context.request_id.as_deref())
    }

    /// Upper-cased method and the resource template (or path when no template).
    pub fn route(&self) -> (String, &str) {
        let resource = self
            .resource
            .as_deref()
            .or(self.path.as_deref())
            .unwrap_or("/");
        (self.http_method.to_ascii_uppercase(), resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_gateway_event() {
        let event: InboundEvent = serde_json::from_value(json!({
            "resource": "/cancel",
            "path": "/cancel",
            "httpMethod": "POST",
            "headers": {"content-type": "application/json"},
            "queryStringParameters": null,
            "multiValueHeaders": {},
            "body": "{\"appointmentId\": 1}",
            "isBase64Encoded": false,
            "requestContext": {
                "requestId": "req-1",
                "authorizer": {"phone": "+59899111222", "shopifyCustomerId": "7001"}
            }
        }))
        .unwrap();

        assert_eq!(event.route(), ("POST".to_string(), "/cancel"));
        assert_eq!(event.request_id(), Some("req-1"));
        assert_eq!(event.customer().phone(), Some("+59899111222"));
        assert_eq!(event.body_text().as_deref(), Some("{\"appointmentId\": 1}"));
    }

    #[test]
    fn test_base64_body_is_decoded() {
        let event = InboundEvent {
            body: Some("eyJhIjogMX0=".to_string()),
            is_base64_encoded: true,
            ..Default::default()
        };

        assert_eq!(event.body_text().as_deref(), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_invalid_base64_body_is_none() {
        let event = InboundEvent {
            body: Some("not base64!".to_string()),
            is_base64_encoded: true,
            ..Default::default()
        };

        assert!(event.body_text().is_none());
    }

    #[test]
    fn test_missing_authorizer_gives_empty_customer() {
        let event = InboundEvent::default();
        assert!(!event.customer().has_contact());
    }

    #[test]
    fn test_route_falls_back_to_path() {
        let event = InboundEvent {
            http_method: "get".to_string(),
            path: Some("/appointment-types".to_string()),
            ..Default::default()
        };

        assert_eq!(event.route(), ("GET".to_string(), "/appointment-types"));
    }
}
