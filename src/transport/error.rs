use serde_json::Value;
use thiserror::Error;

/// Outcome of a failed request, handed to callers as a value.
///
/// Cloneable so one failure can be observed by every subscriber of a query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("request failed with status {status}: {}", message_of(.data))]
    Http { status: u16, data: Value },
    /// No response was received.
    #[error("network error: {0}")]
    Fetch(String),
    /// The response body could not be decoded.
    #[error("failed to parse response: {0}")]
    Parse(String),
    /// The request could not be built.
    #[error("invalid request: {0}")]
    Request(String),
}

impl ApiError {
    pub fn http(status: u16, data: Value) -> Self {
        Self::Http { status, data }
    }

    pub fn request(message: impl Into<String>) -> Self {
        Self::Request(message.into())
    }

    /// HTTP status, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human-readable message suitable for a toast or inline error.
    pub fn message(&self) -> String {
        match self {
            Self::Http { data, .. } => message_of(data),
            Self::Fetch(message) | Self::Parse(message) | Self::Request(message) => message.clone(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// Transient failures that an idempotent request may retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch(_) => true,
            Self::Http { status, .. } => *status >= 500,
            Self::Parse(_) | Self::Request(_) => false,
        }
    }
}

fn message_of(data: &Value) -> String {
    match data.get("message").and_then(Value::as_str) {
        Some(message) => message.to_string(),
        None => data.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn message_prefers_server_message() {
        let err = ApiError::http(422, json!({"message": "title is required"}));
        assert_eq!(err.message(), "title is required");
        assert_eq!(
            err.to_string(),
            "request failed with status 422: title is required"
        );
    }

    #[test]
    fn message_falls_back_to_raw_body() {
        let err = ApiError::http(500, json!({"error": "boom"}));
        assert_eq!(err.message(), r#"{"error":"boom"}"#);
    }

    #[test]
    fn retry_classification() {
        assert!(ApiError::Fetch("connection reset".into()).is_retryable());
        assert!(ApiError::http(503, Value::Null).is_retryable());
        assert!(!ApiError::http(404, Value::Null).is_retryable());
        assert!(!ApiError::Parse("eof".into()).is_retryable());
    }

    #[test]
    fn auth_failures_are_plain_http_errors() {
        let err = ApiError::http(401, json!({"message": "token expired"}));
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(401));
    }
}
