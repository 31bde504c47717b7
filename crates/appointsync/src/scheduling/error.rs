use serde_json::Value;
use thiserror::Error;

/// Failure talking to the scheduling service.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UpstreamError {
    /// A response outside the 2xx range. `body` is the JSON body, or the raw text
    /// when it is not JSON.
    #[error("Upstream responded with status {status}")]
    Status { status: u16, body: Value },
    /// No response: connection failure or timeout.
    #[error("Upstream transport failure: {0}")]
    Transport(String),
    /// A 2xx response whose body is not JSON.
    #[error("Upstream response could not be decoded: {0}")]
    Decode(String),
}

impl UpstreamError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_accessors() {
        let error = UpstreamError::Status {
            status: 404,
            body: json!({"message": "not found"}),
        };

        assert_eq!(error.status(), Some(404));
        assert!(error.is_not_found());
        assert_eq!(error.to_string(), "Upstream responded with status 404");
    }

    #[test]
    fn test_transport_has_no_status() {
        let error = UpstreamError::Transport("timed out".to_string());
        assert_eq!(error.status(), None);
        assert!(!error.is_not_found());
    }
}
