//! Request and response payloads of the department portal REST API.
//!
//! Every successful response is wrapped in an [`Envelope`]; every error
//! response carries an [`ErrorBody`] next to a non-2xx status code.

use serde::{Deserialize, Serialize};

pub mod academics;
pub mod applications;
pub mod auth;
pub mod community;
pub mod content;
pub mod finance;
pub mod records;

/// Success envelope: `{ "data": <payload> }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        self.data
    }
}

/// Error body returned next to a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Arguments of endpoints that take no parameters.
///
/// Serializes as `{}` so every parameterless query shares one cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct NoArgs {}

/// Path argument carrying a single resource id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdArg {
    pub id: String,
}

impl IdArg {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Common paging filter accepted by the list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ListQuery {
    /// Query-string pairs in a stable order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_unwraps_payload() {
        let env: Envelope<Vec<u32>> =
            serde_json::from_str(r#"{"data":[1,2,3]}"#).expect("envelope");
        assert_eq!(env.into_inner(), vec![1, 2, 3]);
    }

    #[test]
    fn no_args_serializes_as_empty_object() {
        let value = serde_json::to_value(NoArgs::default()).expect("value");
        assert_eq!(value, serde_json::json!({}));
    }

    #[test]
    fn list_query_skips_unset_fields() {
        let query = ListQuery {
            limit: Some(20),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&query).expect("value"),
            serde_json::json!({"limit": 20})
        );
        assert_eq!(query.to_pairs(), vec![("limit".into(), "20".into())]);
    }
}
