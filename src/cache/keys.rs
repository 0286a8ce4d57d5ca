//! Cache key definitions.
//!
//! A query is identified by its endpoint name plus the canonical JSON form of
//! its arguments, so argument values that serialize identically share an
//! entry regardless of field order.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::transport::ApiError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    endpoint: &'static str,
    args: Arc<str>,
}

impl QueryKey {
    pub fn new<A: Serialize + ?Sized>(endpoint: &'static str, args: &A) -> Result<Self, ApiError> {
        let value = serde_json::to_value(args).map_err(|e| {
            ApiError::request(format!("arguments of `{endpoint}` are not serializable: {e}"))
        })?;
        Ok(Self {
            endpoint,
            args: canonical_json(&value).into(),
        })
    }

    pub fn endpoint(&self) -> &'static str {
        self.endpoint
    }

    pub fn args(&self) -> &str {
        &self.args
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.endpoint, self.args)
    }
}

/// Serialize `value` with object keys sorted at every level.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            out.push('{');
            for (i, (key, value)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(value, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
