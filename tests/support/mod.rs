//! Scripted in-memory transport shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use deptportal::PortalClient;
use deptportal::cache::CacheConfig;
use deptportal::session::{CookieSession, SessionStore};
use deptportal::transport::{ApiError, ApiRequest, Transport};
use serde_json::{Value, json};
use tokio::sync::oneshot;

type Outcome = Result<Value, ApiError>;

enum Step {
    Now(Outcome),
    Later(oneshot::Receiver<Outcome>),
}

/// Answers requests from a per-route script.
///
/// Queued steps are consumed in order; once a route's queue is empty the
/// route's default reply is used. Routes are written `"GET content/notices"`.
#[derive(Default)]
pub struct ScriptedTransport {
    queued: Mutex<HashMap<String, VecDeque<Step>>>,
    defaults: Mutex<HashMap<String, Outcome>>,
    log: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Reply used whenever nothing is queued for `route`.
    pub fn respond(&self, route: &str, outcome: Outcome) {
        self.defaults
            .lock()
            .expect("defaults lock")
            .insert(route.to_string(), outcome);
    }

    /// Reply to the next request on `route` only.
    pub fn enqueue(&self, route: &str, outcome: Outcome) {
        self.push(route, Step::Now(outcome));
    }

    /// Hold the next request on `route` until the returned sender fires.
    pub fn gate(&self, route: &str) -> oneshot::Sender<Outcome> {
        let (sender, receiver) = oneshot::channel();
        self.push(route, Step::Later(receiver));
        sender
    }

    pub fn calls(&self, route: &str) -> usize {
        self.log
            .lock()
            .expect("log lock")
            .iter()
            .filter(|request| route_of(request) == route)
            .count()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.log.lock().expect("log lock").clone()
    }

    fn push(&self, route: &str, step: Step) {
        self.queued
            .lock()
            .expect("queue lock")
            .entry(route.to_string())
            .or_default()
            .push_back(step);
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let route = route_of(&request);
        self.log.lock().expect("log lock").push(request);
        let step = self
            .queued
            .lock()
            .expect("queue lock")
            .get_mut(&route)
            .and_then(VecDeque::pop_front);
        match step {
            Some(Step::Now(outcome)) => outcome,
            Some(Step::Later(receiver)) => receiver
                .await
                .unwrap_or_else(|_| Err(ApiError::Fetch("gate dropped".into()))),
            None => self
                .defaults
                .lock()
                .expect("defaults lock")
                .get(&route)
                .cloned()
                .unwrap_or_else(|| {
                    Err(ApiError::http(
                        404,
                        json!({ "message": format!("no script for {route}") }),
                    ))
                }),
        }
    }
}

fn route_of(request: &ApiRequest) -> String {
    format!("{} {}", request.method, request.path)
}

/// Wrap `data` in the API's success envelope.
pub fn ok(data: Value) -> Outcome {
    Ok(json!({ "data": data }))
}

pub fn client(transport: &Arc<ScriptedTransport>, cache: CacheConfig) -> PortalClient {
    let session: Arc<dyn SessionStore> = Arc::new(CookieSession::in_memory());
    PortalClient::with_transport(transport.clone(), session, cache)
}

pub fn notice(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "content": "...",
        "createdAt": "2026-09-01T08:00:00Z"
    })
}

pub fn blog_post(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "content": "...",
        "category": "tech",
        "status": "PENDING"
    })
}

pub fn homepage(title: &str) -> Value {
    json!({
        "heroTitle": title,
        "heroSubtitle": "",
        "highlights": [],
        "latestNotices": []
    })
}

pub fn user(id: &str) -> Value {
    json!({
        "id": id,
        "name": "Ada",
        "email": "ada@example.edu",
        "role": "STUDENT"
    })
}
