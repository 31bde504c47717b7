//! Business handlers behind each route.
//!
//! Every handler receives the shared [`AppState`](crate::state::AppState) and the
//! validated request, and answers with an envelope. Rule violations and upstream
//! failures become client or gateway envelopes here; anything else is returned as a
//! [`HandlerError`] and turned into a 500 by the recovery stage.

pub mod appointments;
mod error;
pub mod search;
#[cfg(test)]
pub(crate) mod testing;

pub use error::HandlerError;

use serde_json::json;

use appointsync_core::response::ResponseEnvelope;

use crate::response::make_response;
use crate::scheduling::UpstreamError;

pub const UPSTREAM_QUERY_FAILED: &str = "Error querying the Acuity API";
pub const UPSTREAM_UNREACHABLE: &str = "Error communicating with the Acuity API";
pub const UNAUTHORIZED: &str = "Unauthorized: missing user data (phone or email)";

/// 502 envelope for a failed scheduling call.
///
/// Upstream status errors carry `status_message` and the upstream status and body.
pub fn upstream_failure(error: &UpstreamError, status_message: &str) -> ResponseEnvelope {
    tracing::error!(error = %error, "Scheduling request failed");

    let body = match error {
        UpstreamError::Status { status, body } => json!({
            "success": false,
            "error": status_message,
            "upstream": { "status": status, "body": body },
        }),
        UpstreamError::Transport(_) => json!({
            "success": false,
            "error": UPSTREAM_UNREACHABLE,
        }),
        UpstreamError::Decode(_) => json!({
            "success": false,
            "error": UPSTREAM_QUERY_FAILED,
        }),
    };

    make_response(502, Some(body))
}

/// 401 for a customer without phone or email.
pub fn unauthorized() -> ResponseEnvelope {
    make_response(
        401,
        Some(json!({
            "success": false,
            "error": UNAUTHORIZED,
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_failure_carries_upstream_detail() {
        let error = UpstreamError::Status {
            status: 422,
            body: json!({"message": "bad slot"}),
        };

        let envelope = upstream_failure(&error, "Error creating the appointment in Acuity");

        assert_eq!(envelope.status_code, 502);
        assert_eq!(
            envelope.json_body().unwrap(),
            json!({
                "success": false,
                "error": "Error creating the appointment in Acuity",
                "upstream": {"status": 422, "body": {"message": "bad slot"}}
            })
        );
    }

    #[test]
    fn test_transport_and_decode_failures() {
        let transport = upstream_failure(&UpstreamError::Transport("timeout".into()), "unused");
        let decode = upstream_failure(&UpstreamError::Decode("eof".into()), "unused");

        assert_eq!(transport.json_body().unwrap()["error"], UPSTREAM_UNREACHABLE);
        assert_eq!(decode.json_body().unwrap()["error"], UPSTREAM_QUERY_FAILED);
        assert!(decode.json_body().unwrap().get("upstream").is_none());
    }

    #[test]
    fn test_unauthorized_body() {
        let envelope = unauthorized();

        assert_eq!(envelope.status_code, 401);
        assert_eq!(envelope.json_body().unwrap()["error"], UNAUTHORIZED);
    }
}
