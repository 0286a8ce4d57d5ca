use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::histogram;
use reqwest::{Client, Response, Url};
use serde_json::{Value, json};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::config::ApiSettings;
use crate::session::SessionStore;

use super::{ApiError, ApiRequest, METRIC_TRANSPORT_REQUEST_MS, RequestBody, Transport};

/// reqwest-backed transport with bearer-token injection.
///
/// The token is read from the session store on every call so a login or
/// logout takes effect on the next request.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base: Url,
    session: Arc<dyn SessionStore>,
}

impl HttpTransport {
    pub fn new(
        base: Url,
        timeout: Option<Duration>,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().user_agent(Self::user_agent());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base: normalize_base(base),
            session,
        })
    }

    pub fn from_settings(
        settings: &ApiSettings,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self, reqwest::Error> {
        Self::new(settings.base_url.clone(), settings.request_timeout, session)
    }

    pub fn user_agent() -> &'static str {
        concat!("deptportal/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn url(&self, path: &str, query: &[(String, String)]) -> Result<Url, ApiError> {
        let mut url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::request(format!("invalid path `{path}`: {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn normalize(response: Response) -> Result<Value, ApiError> {
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Fetch(e.to_string()))?;

        if status.is_success() {
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(Value::Null);
            }
            return serde_json::from_slice(&bytes).map_err(|e| ApiError::Parse(e.to_string()));
        }

        let data = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            let text = String::from_utf8_lossy(&bytes).trim().to_string();
            let message = if text.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                text
            };
            json!({ "message": message })
        });
        Err(ApiError::http(status.as_u16(), data))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(
        skip_all,
        fields(method = %request.method, path = %request.path, request_id = %Uuid::new_v4())
    )]
    async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let started_at = Instant::now();
        let method_label = request.method.to_string();
        let url = self.url(&request.path, &request.query)?;

        let mut builder = self.client.request(request.method, url);
        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Multipart(body) => builder.multipart(body.into_form()?),
        };

        let result = match builder.send().await {
            Ok(response) => Self::normalize(response).await,
            Err(err) => Err(ApiError::Fetch(err.to_string())),
        };

        let elapsed_ms = started_at.elapsed().as_secs_f64() * 1000.0;
        histogram!(METRIC_TRANSPORT_REQUEST_MS, "method" => method_label).record(elapsed_ms);
        debug!(
            elapsed_ms,
            status = result.as_ref().err().and_then(ApiError::status),
            ok = result.is_ok(),
            "request finished"
        );
        result
    }
}

fn normalize_base(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::CookieSession;

    fn transport(base: &str) -> HttpTransport {
        HttpTransport::new(
            Url::parse(base).expect("url"),
            None,
            Arc::new(CookieSession::in_memory()),
        )
        .expect("transport")
    }

    #[test]
    fn base_gains_trailing_slash() {
        let t = transport("http://localhost:5000/api");
        assert_eq!(t.base().as_str(), "http://localhost:5000/api/");
        let url = t.url("/content/notices", &[]).expect("url");
        assert_eq!(url.as_str(), "http://localhost:5000/api/content/notices");
    }

    #[test]
    fn query_pairs_are_encoded() {
        let t = transport("http://localhost:5000/api/");
        let url = t
            .url("alumni", &[("search".into(), "data science".into())])
            .expect("url");
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/alumni?search=data+science"
        );
    }
}
