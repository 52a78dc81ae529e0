use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Failure of a backend call, normalized so the UI always has a readable
/// message to show.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    // ── Transport ────────────────────────────────────────────────────────────
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    // ── Server ───────────────────────────────────────────────────────────────
    #[error("Request failed with status code {status}")]
    Status { status: u16 },

    #[error("{detail}")]
    Rejected { status: u16, detail: String },

    // ── Payload ──────────────────────────────────────────────────────────────
    #[error("Parse error: {0}")]
    Decode(String),
}

impl RequestError {
    /// Builds the error for a non-2xx response, keeping the server's detail
    /// text when the body carries one.
    pub fn from_status(status: u16, body: &str) -> Self {
        match extract_detail(body) {
            Some(detail) => RequestError::Rejected { status, detail },
            None => RequestError::Status { status },
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            RequestError::Rejected { detail, .. } => Some(detail),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status } | RequestError::Rejected { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, RequestError::Transport(_) | RequestError::Timeout(_))
    }
}

/// Pulls the human-readable `detail` out of an error body.
///
/// Accepts `{"detail": "text"}` and the validation shape
/// `{"detail": [{"msg": "..."}, ...]}`, whose messages are joined with `"; "`.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let detail = match value.get("detail")? {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.get("msg").and_then(Value::as_str))
            .map(str::trim)
            .filter(|msg| !msg.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        _ => return None,
    };
    (!detail.is_empty()).then_some(detail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_detail_is_used_verbatim() {
        let err = RequestError::from_status(404, r#"{"detail":"Model not found"}"#);
        assert_eq!(err.detail(), Some("Model not found"));
        assert_eq!(err.to_string(), "Model not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn validation_details_are_joined() {
        let body = r#"{"detail":[
            {"loc":["body","recipient_email"],"msg":"value is not a valid email address","type":"value_error"},
            {"loc":["body"],"msg":"field required","type":"missing"}
        ]}"#;
        let err = RequestError::from_status(422, body);
        assert_eq!(
            err.detail(),
            Some("value is not a valid email address; field required")
        );
    }

    #[test]
    fn missing_detail_falls_back_to_status_text() {
        for body in ["", "Internal Server Error", r#"{"error":"x"}"#, r#"{"detail":"  "}"#, r#"{"detail":{"a":1}}"#] {
            let err = RequestError::from_status(500, body);
            assert_eq!(err, RequestError::Status { status: 500 });
            assert_eq!(err.to_string(), "Request failed with status code 500");
        }
    }

    #[test]
    fn transport_failures_have_no_status() {
        let err = RequestError::Timeout(Duration::from_secs(120));
        assert_eq!(err.to_string(), "Request timed out after 120s");
        assert!(err.is_transport());
        assert_eq!(err.status(), None);
        assert_eq!(err.detail(), None);
        assert!(!RequestError::Decode("eof".into()).is_transport());
    }
}
