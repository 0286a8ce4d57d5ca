//! HTTP transport: one request in, one normalized outcome out.

mod error;
mod http;
mod multipart;

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

pub use error::ApiError;
pub use http::HttpTransport;
pub use multipart::{FieldValue, FileUpload, MultipartBody, MultipartField};

pub const METRIC_TRANSPORT_REQUEST_MS: &str = "deptportal_transport_request_ms";

/// Body of an outgoing request.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Sent with `Content-Type: application/json`.
    Json(Value),
    /// Sent as `multipart/form-data`; the boundary header is left to the client.
    Multipart(MultipartBody),
}

/// Request descriptor produced by an endpoint declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the configured base URL, e.g. `content/notices`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append the scalar fields of `params` as query-string pairs.
    ///
    /// `null` fields are skipped; nested values are sent as JSON text.
    pub fn query<T: Serialize + ?Sized>(mut self, params: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(params).map_err(|e| ApiError::request(e.to_string()))?;
        match value {
            Value::Object(map) => {
                for (key, value) in map {
                    match value {
                        Value::Null => {}
                        Value::String(s) => self.query.push((key, s)),
                        other => self.query.push((key, other.to_string())),
                    }
                }
                Ok(self)
            }
            Value::Null => Ok(self),
            other => Err(ApiError::request(format!(
                "query parameters must serialize to an object, got {other}"
            ))),
        }
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::request(e.to_string()))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn multipart(mut self, body: MultipartBody) -> Self {
        self.body = RequestBody::Multipart(body);
        self
    }

    /// Safe to repeat without changing server state.
    pub fn is_idempotent_read(&self) -> bool {
        self.method == Method::GET || self.method == Method::HEAD
    }
}

/// Executes requests against the backend.
///
/// Implementations never touch cache state; they only report what the server
/// said, as a value.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError>;
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Filter {
        category: Option<String>,
        limit: Option<u32>,
        pinned: bool,
    }

    #[test]
    fn query_flattens_scalars_and_skips_nulls() {
        let request = ApiRequest::get("content/notices")
            .query(&Filter {
                category: Some("exam".into()),
                limit: None,
                pinned: true,
            })
            .expect("query");
        assert_eq!(
            request.query,
            vec![
                ("category".to_string(), "exam".to_string()),
                ("pinned".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn query_rejects_non_objects() {
        let err = ApiRequest::get("x").query(&[1, 2]).expect_err("array");
        assert!(matches!(err, ApiError::Request(_)));
    }

    #[test]
    fn json_body_is_recorded() {
        let request = ApiRequest::post("auth/login")
            .json(&serde_json::json!({"email": "a@b.c"}))
            .expect("json");
        assert_eq!(
            request.body,
            RequestBody::Json(serde_json::json!({"email": "a@b.c"}))
        );
        assert!(!request.is_idempotent_read());
    }
}
